use common::model::layout::LayoutSettings;
use rusqlite::{params, Connection};

/// Fetch the singleton layout record, `None` when it was never saved.
pub fn get_settings(conn: &Connection) -> Result<Option<LayoutSettings>, String> {
    let data: Result<String, rusqlite::Error> = conn.query_row(
        "SELECT data FROM layout_settings WHERE id = 1",
        [],
        |row| row.get(0),
    );
    match data {
        Ok(data) => serde_json::from_str(&data).map(Some).map_err(|e| e.to_string()),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.to_string()),
    }
}

/// Create-or-overwrite the singleton layout record.
pub fn put_settings(conn: &Connection, settings: &LayoutSettings) -> Result<(), String> {
    let data = serde_json::to_string(settings).map_err(|e| e.to_string())?;
    conn.execute(
        "INSERT OR REPLACE INTO layout_settings (id, data) VALUES (1, ?1)",
        params![data],
    )
    .map_err(|e| e.to_string())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;

    fn settings(template_ref: &str) -> LayoutSettings {
        LayoutSettings {
            template_ref: template_ref.to_string(),
            anchor_x_percent: 0.5,
            anchor_y_percent: 0.42,
            font_size_absolute: 96.0,
            font_family: "GreatVibes".to_string(),
            font_weight: "normal".to_string(),
            font_style: "normal".to_string(),
            underline: true,
            color: "#1a1a1a".to_string(),
            letter_spacing: Some(1.5),
            line_height: None,
            preview_width: Some(800),
            preview_height: Some(566),
            native_width: Some(2000),
            native_height: Some(1414),
        }
    }

    #[test]
    fn settings_are_a_singleton() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        assert!(get_settings(&conn).unwrap().is_none());

        put_settings(&conn, &settings("a.png")).unwrap();
        put_settings(&conn, &settings("b.png")).unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM layout_settings", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 1);

        let stored = get_settings(&conn).unwrap().unwrap();
        assert_eq!(stored.template_ref, "b.png");
        assert_eq!(stored.letter_spacing, Some(1.5));
        assert!(stored.underline);
    }
}
