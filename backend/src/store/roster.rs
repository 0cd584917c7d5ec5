use common::model::recipient::{Recipient, RecipientStatus};
use rusqlite::{params, Connection};
use uuid::Uuid;

/// One parsed row of the roster CSV, before it becomes a [`Recipient`].
#[derive(Debug, Clone)]
pub struct RosterRow {
    pub name: String,
    pub email: String,
    pub event: String,
}

/// Full roster in insertion order. Batch loops iterate this order so log
/// output reads chronologically against the source file.
pub fn list(conn: &Connection) -> Result<Vec<Recipient>, String> {
    let mut stmt = conn
        .prepare(
            "SELECT id, name, email, event, artifact_path, status
             FROM recipients ORDER BY rowid",
        )
        .map_err(|e| e.to_string())?;
    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, Option<String>>(4)?,
                row.get::<_, String>(5)?,
            ))
        })
        .map_err(|e| e.to_string())?;

    let mut out = Vec::new();
    for row in rows {
        let (id, name, email, event, artifact_path, status) = row.map_err(|e| e.to_string())?;
        out.push(Recipient {
            id,
            name,
            email,
            event,
            artifact_path,
            status: status.parse()?,
        });
    }
    Ok(out)
}

/// Upsert roster rows by email (upload path).
///
/// Existing recipients keep their id, status and artifact; only `name` and
/// `event` are refreshed. New recipients start at `pending`.
pub fn merge_sync(conn: &Connection, rows: &[RosterRow]) -> Result<usize, String> {
    for r in rows {
        let existing: Result<String, rusqlite::Error> = conn.query_row(
            "SELECT id FROM recipients WHERE email = ?1",
            params![r.email],
            |row| row.get(0),
        );
        match existing {
            Ok(_) => {
                conn.execute(
                    "UPDATE recipients SET name = ?1, event = ?2 WHERE email = ?3",
                    params![r.name, r.event, r.email],
                )
                .map_err(|e| e.to_string())?;
            }
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                insert_pending(conn, r)?;
            }
            Err(e) => return Err(e.to_string()),
        }
    }
    Ok(rows.len())
}

/// Replace the whole roster with the given rows (generation path, where the
/// roster file is the declared source of truth). Recipients absent from the
/// file are discarded, everything comes back at `pending`.
///
/// Runs in one transaction: a bad row (say a duplicate email) rolls the
/// whole replace back instead of leaving a half-emptied roster.
pub fn replace_sync(conn: &Connection, rows: &[RosterRow]) -> Result<usize, String> {
    let tx = conn.unchecked_transaction().map_err(|e| e.to_string())?;
    tx.execute("DELETE FROM recipients", [])
        .map_err(|e| e.to_string())?;
    for r in rows {
        insert_pending(&tx, r)?;
    }
    tx.commit().map_err(|e| e.to_string())?;
    Ok(rows.len())
}

fn insert_pending(conn: &Connection, r: &RosterRow) -> Result<(), String> {
    conn.execute(
        "INSERT INTO recipients (id, name, email, event, status)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            Uuid::new_v4().to_string(),
            r.name,
            r.email,
            r.event,
            RecipientStatus::Pending.as_str()
        ],
    )
    .map_err(|e| e.to_string())?;
    Ok(())
}

/// Record a successful render: artifact path set, status advanced.
pub fn set_generated(conn: &Connection, id: &str, artifact_path: &str) -> Result<(), String> {
    conn.execute(
        "UPDATE recipients SET artifact_path = ?1, status = ?2 WHERE id = ?3",
        params![artifact_path, RecipientStatus::Generated.as_str(), id],
    )
    .map_err(|e| e.to_string())?;
    Ok(())
}

/// Record a failed render or send attempt.
pub fn set_failed(conn: &Connection, id: &str) -> Result<(), String> {
    conn.execute(
        "UPDATE recipients SET status = ?1 WHERE id = ?2",
        params![RecipientStatus::Failed.as_str(), id],
    )
    .map_err(|e| e.to_string())?;
    Ok(())
}

/// Advance a recipient to `emailed` after successful dispatch.
///
/// Guarded in SQL: only a `generated` recipient advances, which keeps the
/// status machine honest even for standalone sends that mention an email the
/// roster does not contain. Returns whether a row was updated.
pub fn mark_emailed(conn: &Connection, email: &str) -> Result<bool, String> {
    let n = conn
        .execute(
            "UPDATE recipients SET status = ?1 WHERE email = ?2 AND status = ?3",
            params![
                RecipientStatus::Emailed.as_str(),
                email,
                RecipientStatus::Generated.as_str()
            ],
        )
        .map_err(|e| e.to_string())?;
    Ok(n > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    fn row(name: &str, email: &str) -> RosterRow {
        RosterRow {
            name: name.to_string(),
            email: email.to_string(),
            event: "Hackathon".to_string(),
        }
    }

    #[test]
    fn replace_sync_makes_the_file_the_source_of_truth() {
        let conn = conn();
        replace_sync(&conn, &[row("Alice", "a@x.com"), row("Bob", "b@x.com")]).unwrap();
        let before = list(&conn).unwrap();
        set_generated(&conn, &before[0].id, "certs/a.png").unwrap();

        // New file contains {B, C}: A must disappear, B persists, C is new,
        // and everyone is back at pending.
        replace_sync(&conn, &[row("Bob", "b@x.com"), row("Carol", "c@x.com")]).unwrap();
        let after = list(&conn).unwrap();
        let emails: Vec<&str> = after.iter().map(|r| r.email.as_str()).collect();
        assert_eq!(emails, vec!["b@x.com", "c@x.com"]);
        assert!(after.iter().all(|r| r.status == RecipientStatus::Pending));
    }

    #[test]
    fn replace_sync_rolls_back_on_a_bad_row() {
        let conn = conn();
        replace_sync(&conn, &[row("Alice", "a@x.com")]).unwrap();

        // Duplicate email in the new file violates the UNIQUE constraint;
        // the previous roster must survive intact.
        let bad = [row("Bob", "b@x.com"), row("Robert", "b@x.com")];
        assert!(replace_sync(&conn, &bad).is_err());

        let all = list(&conn).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].email, "a@x.com");
    }

    #[test]
    fn merge_sync_upserts_by_email_and_keeps_status() {
        let conn = conn();
        merge_sync(&conn, &[row("Alice", "a@x.com")]).unwrap();
        let id = list(&conn).unwrap()[0].id.clone();
        set_generated(&conn, &id, "certs/a.png").unwrap();

        merge_sync(&conn, &[row("Alice Smith", "a@x.com"), row("Bob", "b@x.com")]).unwrap();
        let all = list(&conn).unwrap();
        assert_eq!(all.len(), 2);
        let alice = &all[0];
        assert_eq!(alice.id, id, "upsert must keep the stable id");
        assert_eq!(alice.name, "Alice Smith");
        assert_eq!(alice.status, RecipientStatus::Generated);
        assert_eq!(alice.artifact_path.as_deref(), Some("certs/a.png"));
        assert_eq!(all[1].status, RecipientStatus::Pending);
    }

    #[test]
    fn mark_emailed_only_advances_generated_recipients() {
        let conn = conn();
        replace_sync(&conn, &[row("Alice", "a@x.com")]).unwrap();
        // Still pending: no advance.
        assert!(!mark_emailed(&conn, "a@x.com").unwrap());

        let id = list(&conn).unwrap()[0].id.clone();
        set_generated(&conn, &id, "certs/a.png").unwrap();
        assert!(mark_emailed(&conn, "a@x.com").unwrap());
        assert_eq!(list(&conn).unwrap()[0].status, RecipientStatus::Emailed);

        // Unknown recipient: a standalone send, nothing to record.
        assert!(!mark_emailed(&conn, "stranger@x.com").unwrap());
    }

    #[test]
    fn failed_recipients_stay_in_the_roster() {
        let conn = conn();
        replace_sync(&conn, &[row("Alice", "a@x.com")]).unwrap();
        let id = list(&conn).unwrap()[0].id.clone();
        set_failed(&conn, &id).unwrap();
        let all = list(&conn).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].status, RecipientStatus::Failed);
        assert!(all[0].artifact_path.is_none());
    }
}
