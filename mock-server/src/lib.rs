use std::{collections::HashMap, sync::Arc};

use axum::{extract::State, http::StatusCode, routing::post, Form, Json, Router};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tracing::{debug, warn};

pub const QUERY_PATH: &str = "/v1/query";
pub const API_KEY: &str = "testApiKey";
pub const DB_OWNER: &str = "blakegearin";
pub const DB_NAME: &str = "hex-to-css-filter-db.sqlite3";

/// One row of the `color` table.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorRow {
    pub id: u32,
    pub invert: i64,
    pub sepia: i64,
    pub saturate: i64,
    pub hue_rotate: i64,
    pub brightness: i64,
    pub contrast: i64,
    pub loss: f64,
}

impl ColorRow {
    /// The row as the query API returns it: one `{Name, Type, Value}` cell
    /// per column, every value as text.
    pub fn to_cells(&self) -> Value {
        let int = |name: &str, value: i64| json!({ "Name": name, "Type": 4, "Value": value.to_string() });
        json!([
            int("id", i64::from(self.id)),
            int("invert", self.invert),
            int("sepia", self.sepia),
            int("saturate", self.saturate),
            int("hue-rotate", self.hue_rotate),
            int("brightness", self.brightness),
            int("contrast", self.contrast),
            { "Name": "loss", "Type": 5, "Value": self.loss.to_string() },
        ])
    }
}

/// Form fields accepted by the query endpoint. Missing fields are reported
/// as query errors rather than extractor rejections.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct QueryForm {
    pub apikey: Option<String>,
    pub dbowner: Option<String>,
    pub dbname: Option<String>,
    pub sql: Option<String>,
}

#[derive(Debug)]
pub struct Dataset {
    pub api_key: String,
    pub owner: String,
    pub name: String,
    pub colors: HashMap<u32, ColorRow>,
}

impl Dataset {
    pub fn new(rows: impl IntoIterator<Item = ColorRow>) -> Self {
        Self {
            api_key: API_KEY.to_string(),
            owner: DB_OWNER.to_string(),
            name: DB_NAME.to_string(),
            colors: rows.into_iter().map(|row| (row.id, row)).collect(),
        }
    }

    /// A handful of rows for tests and manual runs.
    pub fn seeded() -> Self {
        Self::new(seed_rows())
    }
}

pub type Db = Arc<Dataset>;

pub fn seed_rows() -> Vec<ColorRow> {
    vec![
        ColorRow {
            id: 0x000000,
            invert: 0,
            sepia: 0,
            saturate: 0,
            hue_rotate: 0,
            brightness: 0,
            contrast: 100,
            loss: 0.0,
        },
        ColorRow {
            id: 0x333333,
            invert: 66,
            sepia: 56,
            saturate: 416,
            hue_rotate: 110,
            brightness: 98,
            contrast: 100,
            loss: 0.2578769732,
        },
        ColorRow {
            id: 0x42dead,
            invert: 66,
            sepia: 56,
            saturate: 416,
            hue_rotate: 110,
            brightness: 98,
            contrast: 100,
            loss: 0.2578769732,
        },
        ColorRow {
            id: 0xffffff,
            invert: 100,
            sepia: 0,
            saturate: 0,
            hue_rotate: 0,
            brightness: 100,
            contrast: 100,
            loss: 0.0,
        },
    ]
}

/// A parsed statement the mock understands.
#[derive(Debug, PartialEq, Eq)]
pub enum Statement {
    SelectColor(u32),
    CountColors,
}

/// Recognize the two statements the client issues. Whitespace and keyword
/// case are normalized; the table name may be quoted or bare.
pub fn parse_statement(sql: &str) -> Option<Statement> {
    let normalized = sql
        .trim()
        .trim_end_matches(';')
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_lowercase()
        .replace("'color'", "color");

    if normalized == "select count() from color" || normalized == "select count(*) from color" {
        return Some(Statement::CountColors);
    }
    normalized
        .strip_prefix("select * from color where id = ")
        .and_then(|id| id.parse().ok())
        .map(Statement::SelectColor)
}

pub fn app() -> Router {
    app_with(Arc::new(Dataset::seeded()))
}

pub fn app_with(db: Db) -> Router {
    Router::new()
        .route(QUERY_PATH, post(query))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn error(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<Value>) {
    let message = message.into();
    warn!(%status, %message, "query rejected");
    (status, Json(json!({ "error": message })))
}

async fn query(State(db): State<Db>, Form(form): Form<QueryForm>) -> (StatusCode, Json<Value>) {
    if form.apikey.as_deref() != Some(db.api_key.as_str()) {
        return error(StatusCode::UNAUTHORIZED, "invalid API key");
    }
    if form.dbowner.as_deref() != Some(db.owner.as_str())
        || form.dbname.as_deref() != Some(db.name.as_str())
    {
        return error(StatusCode::NOT_FOUND, "database not found");
    }
    let Some(encoded) = form.sql else {
        return error(StatusCode::BAD_REQUEST, "missing sql");
    };
    let sql = match BASE64
        .decode(encoded.as_bytes())
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
    {
        Some(sql) => sql,
        None => return error(StatusCode::BAD_REQUEST, "sql is not valid base64 text"),
    };
    debug!(%sql, "query");

    match parse_statement(&sql) {
        Some(Statement::SelectColor(id)) => {
            let body = db
                .colors
                .get(&id)
                .map(|row| json!([row.to_cells()]))
                .unwrap_or(Value::Null);
            (StatusCode::OK, Json(body))
        }
        Some(Statement::CountColors) => {
            let count = db.colors.len().to_string();
            let body = json!([[{ "Name": "COUNT()", "Type": 4, "Value": count }]]);
            (StatusCode::OK, Json(body))
        }
        None => error(StatusCode::BAD_REQUEST, format!("unsupported query: {sql}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_color_select() {
        assert_eq!(
            parse_statement("SELECT * FROM 'color' WHERE ID = 4382381"),
            Some(Statement::SelectColor(4382381))
        );
        assert_eq!(
            parse_statement("  select *  from color\nwhere id = 0;"),
            Some(Statement::SelectColor(0))
        );
    }

    #[test]
    fn parses_count() {
        assert_eq!(parse_statement("SELECT COUNT() FROM color"), Some(Statement::CountColors));
        assert_eq!(parse_statement("select count(*) from 'color';"), Some(Statement::CountColors));
    }

    #[test]
    fn rejects_other_sql() {
        assert_eq!(parse_statement("DROP TABLE color"), None);
        assert_eq!(parse_statement("SELECT * FROM 'color' WHERE ID = abc"), None);
        assert_eq!(parse_statement(""), None);
    }

    #[test]
    fn row_renders_as_text_cells() {
        let row = &seed_rows()[1];
        let cells = row.to_cells();
        assert_eq!(cells[0], json!({ "Name": "id", "Type": 4, "Value": "3355443" }));
        assert_eq!(cells[4]["Name"], "hue-rotate");
        assert_eq!(cells[7], json!({ "Name": "loss", "Type": 5, "Value": "0.2578769732" }));
    }

    #[test]
    fn query_form_fields_are_optional() {
        let form: QueryForm = serde_json::from_str("{}").unwrap();
        assert!(form.apikey.is_none());
        assert!(form.sql.is_none());
    }

    #[test]
    fn seeded_dataset_is_keyed_by_id() {
        let db = Dataset::seeded();
        assert!(db.colors.contains_key(&0x42dead));
        assert_eq!(db.colors[&0x333333].saturate, 416);
    }
}
