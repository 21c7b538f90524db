use chrono::NaiveDateTime;
use rusqlite::types::{Type, Value};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

use crate::db::DatabaseError;
use crate::models::{Case, CaseFilter, CasePage, CaseUpdate, NewCase, DEFAULT_SPECIES};

const CASE_COLUMNS: &str = "id, owner_id, patient_name, species, sex, age_info, chief_complaint,
     history, exam_findings, analysis, treatment, prognosis, attachments,
     created_at, updated_at, deleted_at";

fn case_from_row(row: &Row<'_>) -> rusqlite::Result<Case> {
    let attachments = match row.get::<_, Option<String>>(12)? {
        Some(raw) => Some(
            serde_json::from_str(&raw)
                .map_err(|e| rusqlite::Error::FromSqlConversionFailure(12, Type::Text, Box::new(e)))?,
        ),
        None => None,
    };

    Ok(Case {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        patient_name: row.get(2)?,
        species: row.get(3)?,
        sex: row.get(4)?,
        age_info: row.get(5)?,
        chief_complaint: row.get(6)?,
        history: row.get(7)?,
        exam_findings: row.get(8)?,
        analysis: row.get(9)?,
        treatment: row.get(10)?,
        prognosis: row.get(11)?,
        attachments,
        created_at: row.get(13)?,
        updated_at: row.get(14)?,
        deleted_at: row.get(15)?,
    })
}

/// Result of a soft-delete request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SoftDelete {
    Deleted(NaiveDateTime),
    AlreadyDeleted,
}

pub fn insert_case(conn: &Connection, owner_id: i64, case: &NewCase) -> Result<Case, DatabaseError> {
    let species = case
        .species
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(DEFAULT_SPECIES);

    conn.execute(
        "INSERT INTO cases (owner_id, patient_name, species, sex, age_info, chief_complaint,
         history, exam_findings, analysis, treatment, prognosis, attachments)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            owner_id,
            case.patient_name,
            species,
            case.sex,
            case.age_info,
            case.chief_complaint,
            case.history,
            case.exam_findings,
            case.analysis,
            case.treatment,
            case.prognosis,
            case.attachments.as_ref().map(|v| v.to_string()),
        ],
    )?;

    let id = conn.last_insert_rowid();
    get_case(conn, owner_id, id)?.ok_or_else(|| DatabaseError::not_found("case", id))
}

/// Fetch a case owned by `owner_id`, soft-deleted ones included.
pub fn get_case(conn: &Connection, owner_id: i64, id: i64) -> Result<Option<Case>, DatabaseError> {
    let sql = format!("SELECT {CASE_COLUMNS} FROM cases WHERE id = ?1 AND owner_id = ?2");
    Ok(conn
        .query_row(&sql, params![id, owner_id], case_from_row)
        .optional()?)
}

/// Newest-first page of the owner's cases plus the total match count.
pub fn list_cases(
    conn: &Connection,
    owner_id: i64,
    filter: &CaseFilter,
) -> Result<CasePage, DatabaseError> {
    let mut clauses = vec!["owner_id = ?1".to_string()];
    let mut values = vec![Value::Integer(owner_id)];

    if !filter.include_deleted {
        clauses.push("deleted_at IS NULL".to_string());
    }
    if let Some(pattern) = filter.q.as_deref().and_then(like_pattern) {
        values.push(Value::Text(pattern));
        clauses.push(
            "(lower(patient_name) LIKE lower(?2) ESCAPE '\\'
              OR lower(species) LIKE lower(?2) ESCAPE '\\'
              OR lower(chief_complaint) LIKE lower(?2) ESCAPE '\\')"
                .to_string(),
        );
    }
    let where_clause = clauses.join(" AND ");

    let total: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM cases WHERE {where_clause}"),
        params_from_iter(values.iter()),
        |row| row.get(0),
    )?;

    let sql = format!(
        "SELECT {CASE_COLUMNS} FROM cases WHERE {where_clause}
         ORDER BY id DESC LIMIT {} OFFSET {}",
        filter.page_size,
        filter.offset()
    );
    let mut stmt = conn.prepare(&sql)?;
    let items = stmt
        .query_map(params_from_iter(values.iter()), case_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CasePage { items, total })
}

/// Apply the provided fields and bump `updated_at`.
pub fn update_case(
    conn: &Connection,
    owner_id: i64,
    id: i64,
    update: &CaseUpdate,
) -> Result<Case, DatabaseError> {
    let mut sets: Vec<String> = Vec::new();
    let mut values: Vec<Value> = Vec::new();
    let mut set = |column: &str, value: Option<Value>| {
        if let Some(value) = value {
            values.push(value);
            sets.push(format!("{column} = ?{}", values.len()));
        }
    };

    set("patient_name", text(&update.patient_name));
    set("species", text(&update.species));
    set("sex", text(&update.sex));
    set("age_info", text(&update.age_info));
    set("chief_complaint", text(&update.chief_complaint));
    set("history", text(&update.history));
    set("exam_findings", text(&update.exam_findings));
    set("analysis", text(&update.analysis));
    set("treatment", text(&update.treatment));
    set("prognosis", text(&update.prognosis));
    set(
        "attachments",
        update.attachments.as_ref().map(|v| Value::Text(v.to_string())),
    );
    sets.push("updated_at = datetime('now')".to_string());

    values.push(Value::Integer(id));
    values.push(Value::Integer(owner_id));
    let sql = format!(
        "UPDATE cases SET {} WHERE id = ?{} AND owner_id = ?{}",
        sets.join(", "),
        values.len() - 1,
        values.len()
    );

    let changed = conn.execute(&sql, params_from_iter(values.iter()))?;
    if changed == 0 {
        return Err(DatabaseError::not_found("case", id));
    }
    get_case(conn, owner_id, id)?.ok_or_else(|| DatabaseError::not_found("case", id))
}

/// Mark a case deleted. Deleting twice keeps the first timestamp.
pub fn soft_delete_case(
    conn: &Connection,
    owner_id: i64,
    id: i64,
) -> Result<SoftDelete, DatabaseError> {
    let case = get_case(conn, owner_id, id)?.ok_or_else(|| DatabaseError::not_found("case", id))?;
    if case.is_deleted() {
        return Ok(SoftDelete::AlreadyDeleted);
    }

    conn.execute(
        "UPDATE cases SET deleted_at = datetime('now')
         WHERE id = ?1 AND owner_id = ?2 AND deleted_at IS NULL",
        params![id, owner_id],
    )?;
    let deleted_at: NaiveDateTime = conn.query_row(
        "SELECT deleted_at FROM cases WHERE id = ?1",
        params![id],
        |row| row.get(0),
    )?;
    Ok(SoftDelete::Deleted(deleted_at))
}

/// Clear `deleted_at`. A case that is not deleted is returned unchanged.
pub fn restore_case(conn: &Connection, owner_id: i64, id: i64) -> Result<Case, DatabaseError> {
    let case = get_case(conn, owner_id, id)?.ok_or_else(|| DatabaseError::not_found("case", id))?;
    if !case.is_deleted() {
        return Ok(case);
    }

    conn.execute(
        "UPDATE cases SET deleted_at = NULL, updated_at = datetime('now')
         WHERE id = ?1 AND owner_id = ?2",
        params![id, owner_id],
    )?;
    get_case(conn, owner_id, id)?.ok_or_else(|| DatabaseError::not_found("case", id))
}

fn text(value: &Option<String>) -> Option<Value> {
    value.clone().map(Value::Text)
}

/// `%q%` with LIKE wildcards escaped. Blank queries match everything.
fn like_pattern(q: &str) -> Option<String> {
    let q = q.trim();
    if q.is_empty() {
        return None;
    }
    let mut pattern = String::with_capacity(q.len() + 2);
    pattern.push('%');
    for c in q.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    Some(pattern)
}
