use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio_postgres::Row;
use tracing::{info, instrument};

use crate::db::util::TimedClientExt;
use crate::db::PgPool;
use crate::matching::MatchingResult;

db_error!(MatchResultStorageError {});

/// 保存済みのマッチング結果（一覧表示用にエンジニア名を結合）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredMatchingResult {
    pub id: i64,
    pub engineer_name: String,
    #[serde(flatten)]
    pub result: MatchingResult,
    pub created_at: DateTime<Utc>,
}

fn map_stored_row(row: &Row) -> StoredMatchingResult {
    StoredMatchingResult {
        id: row.get("id"),
        engineer_name: row.get("full_name"),
        result: MatchingResult {
            project_id: row.get("project_id"),
            engineer_id: row.get("engineer_id"),
            score: row.get("score"),
            skill_match_rate: row.get("skill_match_rate"),
            rate_match: row.get("rate_match"),
            availability_match: row.get("availability_match"),
            tier_eligible: row.get("tier_eligible"),
        },
        created_at: row.get("created_at"),
    }
}

/// 同一案件のマッチング実行を直列化するアドバイザリロックの分類キー
const MATCHING_LOCK_CLASS: i32 = 0x5E5_0002;

const INSERT_MATCHING_RESULT: &str = "INSERT INTO ses.matching_results (
        project_id,
        engineer_id,
        score,
        skill_match_rate,
        rate_match,
        availability_match,
        tier_eligible
    ) VALUES ($1, $2, $3, $4, $5, $6, $7)";

/// 案件単位で結果を置き換える書き込み先
trait ResultSink {
    type Error;

    async fn lock_project(&self, project_id: i64) -> Result<(), Self::Error>;
    async fn clear_project(&self, project_id: i64) -> Result<u64, Self::Error>;
    async fn insert_result(
        &self,
        project_id: i64,
        result: &MatchingResult,
    ) -> Result<u64, Self::Error>;
}

impl ResultSink for deadpool_postgres::Transaction<'_> {
    type Error = tokio_postgres::Error;

    async fn lock_project(&self, project_id: i64) -> Result<(), Self::Error> {
        self.timed_execute(
            "SELECT pg_advisory_xact_lock($1, hashint8($2))",
            &[&MATCHING_LOCK_CLASS, &project_id],
            "matching_results_lock",
        )
        .await?;
        Ok(())
    }

    async fn clear_project(&self, project_id: i64) -> Result<u64, Self::Error> {
        self.timed_execute(
            "DELETE FROM ses.matching_results WHERE project_id = $1",
            &[&project_id],
            "delete_matching_results",
        )
        .await
    }

    async fn insert_result(
        &self,
        project_id: i64,
        result: &MatchingResult,
    ) -> Result<u64, Self::Error> {
        let stmt = self.prepare_cached(INSERT_MATCHING_RESULT).await?;
        self.timed_execute(
            &stmt,
            &[
                &project_id,
                &result.engineer_id,
                &result.score,
                &result.skill_match_rate,
                &result.rate_match,
                &result.availability_match,
                &result.tier_eligible,
            ],
            "insert_matching_result",
        )
        .await
    }
}

/// ロック取得後に前回分を消してから挿入する。戻り値は (削除件数, 挿入件数)
async fn replace_in<S: ResultSink>(
    sink: &S,
    project_id: i64,
    results: &[MatchingResult],
) -> Result<(u64, u64), S::Error> {
    sink.lock_project(project_id).await?;
    let deleted = sink.clear_project(project_id).await?;

    let mut inserted = 0;
    for result in results {
        inserted += sink.insert_result(project_id, result).await?;
    }

    Ok((deleted, inserted))
}

/// 案件の前回結果を削除して今回の結果を挿入する（1 トランザクション）
///
/// 同じ案件への同時実行はアドバイザリロックで待ち合わせる。
#[instrument(skip(pool, results), fields(count = results.len()))]
pub async fn replace_matching_results(
    pool: &PgPool,
    project_id: i64,
    results: &[MatchingResult],
) -> Result<u64, MatchResultStorageError> {
    let mut client = pool.get().await?;
    let tx = client.transaction().await?;

    let (deleted, inserted) = replace_in(&tx, project_id, results).await?;

    tx.commit().await?;

    info!(project_id, deleted, inserted, "matching results replaced");
    Ok(inserted)
}

/// スコア降順（同点は挿入順）で結果を返す。総件数も併せて返す
#[instrument(skip(pool))]
pub async fn list_matching_results(
    pool: &PgPool,
    project_id: i64,
    limit: i64,
    offset: i64,
) -> Result<(Vec<StoredMatchingResult>, i64), MatchResultStorageError> {
    let client = pool.get().await?;

    let total: i64 = client
        .timed_query_one(
            "SELECT COUNT(*) FROM ses.matching_results WHERE project_id = $1",
            &[&project_id],
            "count_matching_results",
        )
        .await?
        .get(0);

    let rows = client
        .timed_query(
            "SELECT \
                mr.id,\
                mr.project_id,\
                mr.engineer_id,\
                e.full_name,\
                mr.score,\
                mr.skill_match_rate,\
                mr.rate_match,\
                mr.availability_match,\
                mr.tier_eligible,\
                mr.created_at \
            FROM ses.matching_results mr \
            JOIN ses.engineers e ON e.id = mr.engineer_id \
            WHERE mr.project_id = $1 \
            ORDER BY mr.score DESC, mr.id ASC \
            LIMIT $2 OFFSET $3",
            &[&project_id, &limit, &offset],
            "list_matching_results",
        )
        .await?;

    Ok((rows.iter().map(map_stored_row).collect(), total))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use chrono::TimeZone;

    /// (project_id, engineer_id) の一意制約だけを持つメモリ上の書き込み先
    #[derive(Default)]
    struct MemorySink {
        rows: Mutex<Vec<(i64, i64)>>,
        calls: Mutex<Vec<&'static str>>,
    }

    impl MemorySink {
        fn count(&self, project_id: i64) -> usize {
            self.rows
                .lock()
                .unwrap()
                .iter()
                .filter(|(project, _)| *project == project_id)
                .count()
        }
    }

    impl ResultSink for MemorySink {
        type Error = String;

        async fn lock_project(&self, _project_id: i64) -> Result<(), Self::Error> {
            self.calls.lock().unwrap().push("lock");
            Ok(())
        }

        async fn clear_project(&self, project_id: i64) -> Result<u64, Self::Error> {
            self.calls.lock().unwrap().push("clear");
            let mut rows = self.rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|(project, _)| *project != project_id);
            Ok((before - rows.len()) as u64)
        }

        async fn insert_result(
            &self,
            project_id: i64,
            result: &MatchingResult,
        ) -> Result<u64, Self::Error> {
            self.calls.lock().unwrap().push("insert");
            let key = (project_id, result.engineer_id);
            let mut rows = self.rows.lock().unwrap();
            if rows.contains(&key) {
                return Err(format!("duplicate key {key:?}"));
            }
            rows.push(key);
            Ok(1)
        }
    }

    fn result_for(project_id: i64, engineer_id: i64) -> MatchingResult {
        MatchingResult {
            project_id,
            engineer_id,
            score: 0.5,
            skill_match_rate: 0.5,
            rate_match: true,
            availability_match: false,
            tier_eligible: true,
        }
    }

    #[tokio::test]
    async fn rerun_keeps_one_row_per_engineer() {
        let sink = MemorySink::default();
        sink.rows.lock().unwrap().push((2, 10));

        let results = [result_for(1, 10), result_for(1, 11), result_for(1, 12)];

        assert_eq!(replace_in(&sink, 1, &results).await.unwrap(), (0, 3));
        assert_eq!(replace_in(&sink, 1, &results).await.unwrap(), (3, 3));

        assert_eq!(sink.count(1), results.len());
        assert_eq!(sink.count(2), 1);
    }

    #[tokio::test]
    async fn replacement_locks_the_project_before_touching_rows() {
        let sink = MemorySink::default();
        replace_in(&sink, 1, &[result_for(1, 10), result_for(1, 11)])
            .await
            .unwrap();

        assert_eq!(
            *sink.calls.lock().unwrap(),
            vec!["lock", "clear", "insert", "insert"]
        );
    }

    #[test]
    fn stored_result_serializes_flat() {
        let stored = StoredMatchingResult {
            id: 7,
            engineer_name: "山田 太郎".into(),
            result: MatchingResult {
                project_id: 1,
                engineer_id: 2,
                score: 0.75,
                skill_match_rate: 0.5,
                rate_match: true,
                availability_match: true,
                tier_eligible: true,
            },
            created_at: Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap(),
        };

        let json = serde_json::to_value(&stored).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["engineer_id"], 2);
        assert_eq!(json["score"], 0.75);
        assert_eq!(json["engineer_name"], "山田 太郎");
        assert!(json.get("result").is_none());
    }
}
