use crate::error::Result;
use chrono::NaiveDate;
use index_core::entry::DoujinshiOrgEntry;
use sqlx::{FromRow, SqlitePool};

#[derive(FromRow)]
struct EntryRow {
    id: i64,
    title: String,
    circle: Option<String>,
    age_group: i64,
    parody: String,
    release_date: Option<String>,
    thumbnail: Vec<u8>,
}

/// Reads every doujinshi.org entry out of the raw `doujinshi_org_entries`
/// table, translating its `0000-00-00` unknown-date sentinel to `None`
/// (§3).
pub async fn fetch_all(pool: &SqlitePool) -> Result<Vec<DoujinshiOrgEntry>> {
    let rows: Vec<EntryRow> = sqlx::query_as(
        "SELECT id, title, circle, age_group, parody, release_date, thumbnail FROM doujinshi_org_entries",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| DoujinshiOrgEntry {
            id: r.id as u64,
            title: r.title,
            circle: r.circle,
            age_group: r.age_group as u8,
            parody: r.parody,
            release_date: parse_release_date(r.release_date.as_deref()),
            thumbnail: r.thumbnail,
        })
        .collect())
}

fn parse_release_date(raw: Option<&str>) -> Option<NaiveDate> {
    match raw {
        Some("0000-00-00") | None => None,
        Some(date) => NaiveDate::parse_from_str(date, "%Y-%m-%d").ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_date_becomes_none() {
        assert_eq!(parse_release_date(Some("0000-00-00")), None);
    }

    #[test]
    fn valid_date_parses() {
        assert_eq!(
            parse_release_date(Some("2010-05-01")),
            NaiveDate::from_ymd_opt(2010, 5, 1)
        );
    }
}
