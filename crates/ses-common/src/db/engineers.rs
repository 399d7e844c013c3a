use std::collections::HashSet;
use std::str::FromStr;

use tokio_postgres::Row;
use tracing::instrument;

use crate::db::util::TimedClientExt;
use crate::db::PgPool;
use crate::{AvailabilityStatus, EmploymentType, Engineer, Project, SubcontractingTierLimit};

db_error!(MatchingStorageError {
    #[error("project not found: {0}")]
    ProjectNotFound(i64),
    #[error("engineer not found: {0}")]
    EngineerNotFound(i64),
    #[error("failed to map row: {0}")]
    Mapping(String),
});

const ENGINEER_COLUMNS: &str = "SELECT \
        e.id,\
        e.full_name,\
        e.employment_type,\
        e.company_id,\
        e.monthly_rate,\
        e.availability_status,\
        e.is_active,\
        COALESCE(array_agg(es.skill_id) FILTER (WHERE es.skill_id IS NOT NULL), '{}') AS skills \
    FROM ses.engineers e \
    LEFT JOIN ses.engineer_skills es ON es.engineer_id = e.id";

fn parse_enum<T: FromStr>(column: &str, raw: &str) -> Result<T, MatchingStorageError> {
    T::from_str(raw).map_err(|_| MatchingStorageError::Mapping(format!("{column}={raw}")))
}

fn map_engineer_row(row: &Row) -> Result<Engineer, MatchingStorageError> {
    let employment_type: String = row.get("employment_type");
    let availability: String = row.get("availability_status");
    let skills: Vec<i64> = row.get("skills");

    Ok(Engineer {
        id: row.get("id"),
        full_name: row.get("full_name"),
        employment_type: parse_enum::<EmploymentType>("employment_type", &employment_type)?,
        company_id: row.get("company_id"),
        monthly_rate: row.get("monthly_rate"),
        availability_status: parse_enum::<AvailabilityStatus>(
            "availability_status",
            &availability,
        )?,
        skills: skills.into_iter().collect(),
        is_active: row.get("is_active"),
    })
}

fn parse_tier_limit(raw: Option<&str>) -> Result<Option<SubcontractingTierLimit>, MatchingStorageError> {
    raw.map(|value| parse_enum::<SubcontractingTierLimit>("subcontracting_tier_limit", value))
        .transpose()
}

/// 必須スキルを含めて案件を読み込む
#[instrument(skip(pool))]
pub async fn fetch_project(pool: &PgPool, project_id: i64) -> Result<Project, MatchingStorageError> {
    let client = pool.get().await?;
    let row = client
        .timed_query_opt(
            "SELECT \
                p.id,\
                p.name,\
                p.subcontracting_tier_limit,\
                p.budget,\
                COALESCE(array_agg(prs.skill_id) FILTER (WHERE prs.skill_id IS NOT NULL), '{}') AS required_skills \
            FROM ses.projects p \
            LEFT JOIN ses.project_required_skills prs ON prs.project_id = p.id \
            WHERE p.id = $1 \
            GROUP BY p.id",
            &[&project_id],
            "fetch_project",
        )
        .await?
        .ok_or(MatchingStorageError::ProjectNotFound(project_id))?;

    let limit: Option<String> = row.get("subcontracting_tier_limit");
    let required: Vec<i64> = row.get("required_skills");

    Ok(Project {
        id: row.get("id"),
        name: row.get("name"),
        subcontracting_tier_limit: parse_tier_limit(limit.as_deref())?,
        budget: row.get("budget"),
        required_skills: required.into_iter().collect::<HashSet<_>>(),
    })
}

#[instrument(skip(pool))]
pub async fn fetch_engineer(
    pool: &PgPool,
    engineer_id: i64,
) -> Result<Engineer, MatchingStorageError> {
    let client = pool.get().await?;
    let query = format!("{ENGINEER_COLUMNS} WHERE e.id = $1 GROUP BY e.id");
    let row = client
        .timed_query_opt(query.as_str(), &[&engineer_id], "fetch_engineer")
        .await?
        .ok_or(MatchingStorageError::EngineerNotFound(engineer_id))?;

    map_engineer_row(&row)
}

/// マッチング対象のエンジニア（is_active のみ）を ID 順で読み込む
#[instrument(skip(pool))]
pub async fn fetch_active_engineers(pool: &PgPool) -> Result<Vec<Engineer>, MatchingStorageError> {
    let client = pool.get().await?;
    let query = format!("{ENGINEER_COLUMNS} WHERE e.is_active GROUP BY e.id ORDER BY e.id");
    let rows = client
        .timed_query(query.as_str(), &[], "fetch_active_engineers")
        .await?;

    rows.iter().map(map_engineer_row).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_enum_values() {
        assert_eq!(
            parse_enum::<EmploymentType>("employment_type", "first_tier_freelancer").unwrap(),
            EmploymentType::FirstTierFreelancer
        );
        assert_eq!(
            parse_enum::<AvailabilityStatus>("availability_status", "assigned").unwrap(),
            AvailabilityStatus::Assigned
        );
    }

    #[test]
    fn unknown_enum_value_is_a_mapping_error() {
        let err = parse_enum::<EmploymentType>("employment_type", "contractor").unwrap_err();
        assert!(matches!(err, MatchingStorageError::Mapping(ref m) if m == "employment_type=contractor"));
    }

    #[test]
    fn missing_tier_limit_stays_none() {
        assert_eq!(parse_tier_limit(None).unwrap(), None);
        assert_eq!(
            parse_tier_limit(Some("proper_only")).unwrap(),
            Some(SubcontractingTierLimit::ProperOnly)
        );
        assert!(parse_tier_limit(Some("third_tier")).is_err());
    }
}
