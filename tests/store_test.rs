//! Integration tests for the relational store
//!
//! Run with: cargo test --test store_test

use lectary::core::AppError;
use lectary::storage::db::{self, DbPool};
use lectary::storage::files;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn test_pool() -> (TempDir, DbPool) {
    let dir = TempDir::new().expect("create temp dir");
    let path = dir.path().join("store.db");
    let pool = db::create_pool(path.to_str().expect("utf-8 temp path")).expect("create pool");
    (dir, pool)
}

// ============================================================================
// Users
// ============================================================================

#[test]
fn test_upsert_user_stores_latest_name() {
    let (_dir, pool) = test_pool();
    let conn = db::get_connection(&pool).expect("get connection");

    db::upsert_user(&conn, 101, "Oleg").expect("first upsert");
    assert_eq!(db::get_user_name(&conn, 101).expect("lookup"), Some("Oleg".to_string()));

    // Repeat with the same name: idempotent
    db::upsert_user(&conn, 101, "Oleg").expect("repeat upsert");
    assert_eq!(db::get_user_name(&conn, 101).expect("lookup"), Some("Oleg".to_string()));

    // Re-register with a new name: last write wins
    db::upsert_user(&conn, 101, "Олег").expect("rename upsert");
    assert_eq!(db::get_user_name(&conn, 101).expect("lookup"), Some("Олег".to_string()));
}

#[test]
fn test_upsert_user_rejects_bad_input() {
    let (_dir, pool) = test_pool();
    let conn = db::get_connection(&pool).expect("get connection");

    assert!(matches!(db::upsert_user(&conn, 0, "Oleg"), Err(AppError::Validation(_))));
    assert!(matches!(db::upsert_user(&conn, -5, "Oleg"), Err(AppError::Validation(_))));
    assert!(matches!(db::upsert_user(&conn, 101, "   "), Err(AppError::Validation(_))));
}

#[test]
fn test_get_user_name_unknown_is_none() {
    let (_dir, pool) = test_pool();
    let conn = db::get_connection(&pool).expect("get connection");

    assert_eq!(db::get_user_name(&conn, 999).expect("lookup"), None);
    assert_eq!(db::get_user_name(&conn, -1).expect("lookup"), None);
}

// ============================================================================
// Files
// ============================================================================

#[test]
fn test_create_file_requires_known_owner() {
    let (_dir, pool) = test_pool();
    let conn = db::get_connection(&pool).expect("get connection");

    let result = files::create_file(&conn, 42, "storage/42_a.pdf_1.pdf", "матан", "a.pdf");
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[test]
fn test_create_file_ids_strictly_increase() {
    let (_dir, pool) = test_pool();
    let conn = db::get_connection(&pool).expect("get connection");
    db::upsert_user(&conn, 101, "Oleg").expect("upsert user");

    let mut last_id = 0;
    for n in 0..3 {
        let path = format!("storage/101_f{}.pdf_{}.pdf", n, n);
        let id = files::create_file(&conn, 101, &path, "матан", "f.pdf").expect("create file");
        assert!(id > last_id, "ids must strictly increase: {} after {}", id, last_id);
        last_id = id;
    }
}

#[test]
fn test_create_file_rejects_blank_fields() {
    let (_dir, pool) = test_pool();
    let conn = db::get_connection(&pool).expect("get connection");
    db::upsert_user(&conn, 101, "Oleg").expect("upsert user");

    assert!(matches!(
        files::create_file(&conn, 101, "  ", "матан", "a.pdf"),
        Err(AppError::Validation(_))
    ));
    assert!(matches!(
        files::create_file(&conn, 101, "storage/a.pdf", "  ", "a.pdf"),
        Err(AppError::Validation(_))
    ));
    assert!(matches!(
        files::create_file(&conn, 101, "storage/a.pdf", "матан", ""),
        Err(AppError::Validation(_))
    ));
}

#[test]
fn test_get_file_path_total_on_bad_ids() {
    let (_dir, pool) = test_pool();
    let conn = db::get_connection(&pool).expect("get connection");

    assert_eq!(files::get_file_path(&conn, 0), None);
    assert_eq!(files::get_file_path(&conn, -3), None);
    assert_eq!(files::get_file_path(&conn, 12345), None);
}

#[test]
fn test_list_user_files_empty_for_unknown() {
    let (_dir, pool) = test_pool();
    let conn = db::get_connection(&pool).expect("get connection");

    assert!(files::list_user_files(&conn, 999).expect("list").is_empty());
    assert!(files::list_user_files(&conn, -1).expect("list").is_empty());
}

// ============================================================================
// Ratings
// ============================================================================

#[test]
fn test_average_rating_empty_is_zero() {
    let (_dir, pool) = test_pool();
    let conn = db::get_connection(&pool).expect("get connection");
    db::upsert_user(&conn, 101, "Oleg").expect("upsert user");
    let file_id = files::create_file(&conn, 101, "storage/a.pdf", "матан", "a.pdf").expect("create file");

    assert_eq!(files::average_rating(&conn, file_id).expect("average"), 0.0);
}

#[test]
fn test_rating_upsert_and_average() {
    let (_dir, pool) = test_pool();
    let conn = db::get_connection(&pool).expect("get connection");
    db::upsert_user(&conn, 101, "Oleg").expect("upsert user");
    let file_id = files::create_file(&conn, 101, "storage/a.pdf", "матан", "a.pdf").expect("create file");

    // Raters A (2) and B (4): mean 3.0
    files::rate_file(&conn, file_id, 201, 2).expect("rate A");
    files::rate_file(&conn, file_id, 202, 4).expect("rate B");
    assert_eq!(files::average_rating(&conn, file_id).expect("average"), 3.0);

    // A re-rates to 5: overwrites, (5 + 4) / 2 = 4.5
    files::rate_file(&conn, file_id, 201, 5).expect("re-rate A");
    assert_eq!(files::average_rating(&conn, file_id).expect("average"), 4.5);
}

#[test]
fn test_rate_file_score_bounds() {
    let (_dir, pool) = test_pool();
    let conn = db::get_connection(&pool).expect("get connection");
    db::upsert_user(&conn, 101, "Oleg").expect("upsert user");
    let file_id = files::create_file(&conn, 101, "storage/a.pdf", "матан", "a.pdf").expect("create file");

    assert!(matches!(
        files::rate_file(&conn, file_id, 201, 0),
        Err(AppError::Validation(_))
    ));
    assert!(matches!(
        files::rate_file(&conn, file_id, 201, 6),
        Err(AppError::Validation(_))
    ));
    assert!(files::rate_file(&conn, file_id, 201, 1).is_ok());
    assert!(files::rate_file(&conn, file_id, 201, 5).is_ok());
}

#[test]
fn test_rate_file_unknown_file() {
    let (_dir, pool) = test_pool();
    let conn = db::get_connection(&pool).expect("get connection");

    assert!(matches!(
        files::rate_file(&conn, 12345, 201, 3),
        Err(AppError::NotFound(_))
    ));
}

#[test]
fn test_average_rating_rejects_bad_id() {
    let (_dir, pool) = test_pool();
    let conn = db::get_connection(&pool).expect("get connection");

    assert!(matches!(files::average_rating(&conn, 0), Err(AppError::Validation(_))));
}

// ============================================================================
// Search
// ============================================================================

#[test]
fn test_search_matches_words_not_substrings() {
    let (_dir, pool) = test_pool();
    let conn = db::get_connection(&pool).expect("get connection");
    db::upsert_user(&conn, 101, "Oleg").expect("upsert user");
    files::create_file(&conn, 101, "storage/a.pdf", "матан, лекция", "a.pdf").expect("create matan file");
    files::create_file(&conn, 101, "storage/b.pdf", "физика", "b.pdf").expect("create physics file");

    let hits = files::search_files(&conn, "матан").expect("search");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].tags, "матан, лекция");

    // Word-boundary matching: a prefix of a tag word is not a hit
    assert!(files::search_files(&conn, "мат").expect("search").is_empty());

    // Case-insensitive on both sides
    assert_eq!(files::search_files(&conn, "МАТАН").expect("search").len(), 1);
    assert_eq!(files::search_files(&conn, "ФиЗиКа").expect("search").len(), 1);
}

#[test]
fn test_search_any_word_intersection() {
    let (_dir, pool) = test_pool();
    let conn = db::get_connection(&pool).expect("get connection");
    db::upsert_user(&conn, 101, "Oleg").expect("upsert user");
    files::create_file(&conn, 101, "storage/a.pdf", "матан, лекция", "a.pdf").expect("create file");

    // OR semantics: one matching word out of several is enough
    let hits = files::search_files(&conn, "физика лекция химия").expect("search");
    assert_eq!(hits.len(), 1);
}

#[test]
fn test_search_blank_query_is_validation_error() {
    let (_dir, pool) = test_pool();
    let conn = db::get_connection(&pool).expect("get connection");

    assert!(matches!(files::search_files(&conn, "   "), Err(AppError::Validation(_))));
}

// ============================================================================
// End-to-end
// ============================================================================

#[test]
fn test_upload_rate_search_flow() {
    let (_dir, pool) = test_pool();
    let conn = db::get_connection(&pool).expect("get connection");

    db::upsert_user(&conn, 101, "Oleg").expect("register user");
    let file_id = files::create_file(&conn, 101, "storage/101_Lecture.pdf_1700000000.pdf", "matan, limits", "Lecture.pdf")
        .expect("upload file");
    files::rate_file(&conn, file_id, 101, 4).expect("rate file");

    let hits = files::search_files(&conn, "matan").expect("search");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].file_id, file_id);
    assert_eq!(hits[0].display_name, "Lecture.pdf");
    assert_eq!(hits[0].author_name, "Oleg");
    assert_eq!(hits[0].rating, 4.0);

    // The uploader's profile shows the same file and rating
    let owned = files::list_user_files(&conn, 101).expect("list files");
    assert_eq!(owned.len(), 1);
    assert_eq!(owned[0].file_id, file_id);
    assert_eq!(owned[0].rating, 4.0);

    // And the download path resolves
    assert_eq!(
        files::get_file_path(&conn, file_id),
        Some("storage/101_Lecture.pdf_1700000000.pdf".to_string())
    );
}
