//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{Duration, TimeZone, Utc};
use mien_core::{
  acl::{Action, Permission, Resource, Session},
  face::{Face, FaceSearchQuery, Marker},
  store::{FaceStore, SessionResolver},
};

use crate::{Error, MAX_RESULTS, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn face(id: &str, samples: u32) -> Face {
  let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
  Face {
    id:               id.into(),
    face_src:         "auto".into(),
    hidden:           false,
    subj_uid:         None,
    samples,
    sample_radius:    0.35,
    collisions:       0,
    collision_radius: 0.0,
    matched_at:       None,
    created_at:       at,
    updated_at:       at,
    markers:          None,
  }
}

fn marker(uid: &str) -> Marker {
  Marker {
    uid:      uid.into(),
    file_uid: "fs6sg6bw45bnlqdw".into(),
    subj_uid: None,
    x:        0.1,
    y:        0.2,
    w:        0.05,
    h:        0.08,
    score:    120,
    invalid:  false,
  }
}

/// Three faces in descending sample order: a (9), b (5), c (1).
async fn seeded() -> SqliteStore {
  let s = store().await;
  s.insert_subject("subj001", "Jane Doe").await.unwrap();
  s.insert_face(&face("c", 1)).await.unwrap();
  s.insert_face(&face("a", 9)).await.unwrap();
  s.insert_face(&face("b", 5)).await.unwrap();
  s
}

fn ids(faces: &[Face]) -> Vec<&str> {
  faces.iter().map(|f| f.id.as_str()).collect()
}

// ─── Search ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn search_orders_by_samples_descending() {
  let s = seeded().await;
  let res = s.search_faces(&FaceSearchQuery::default()).await.unwrap();
  assert_eq!(ids(&res.faces), ["a", "b", "c"]);
  assert_eq!(res.total, 3);
}

#[tokio::test]
async fn search_paginates() {
  let s = seeded().await;
  let q = FaceSearchQuery { count: 1, offset: 1, ..Default::default() };
  let res = s.search_faces(&q).await.unwrap();
  assert_eq!(ids(&res.faces), ["b"]);
  assert_eq!(res.total, 3);
}

#[tokio::test]
async fn offset_past_i64_range_is_an_empty_page() {
  let s = seeded().await;
  let q = FaceSearchQuery { offset: usize::MAX, ..Default::default() };
  let res = s.search_faces(&q).await.unwrap();
  assert!(res.faces.is_empty());
  assert_eq!(res.total, 3);
}

#[tokio::test]
async fn search_by_id_returns_at_most_one() {
  let s = seeded().await;
  let res = s.search_faces(&FaceSearchQuery::by_id("b")).await.unwrap();
  assert_eq!(ids(&res.faces), ["b"]);

  let res = s.search_faces(&FaceSearchQuery::by_id("zzz")).await.unwrap();
  assert!(res.faces.is_empty());
}

#[tokio::test]
async fn search_embeds_markers_only_when_asked() {
  let s = seeded().await;
  s.insert_marker("a", &marker("m2")).await.unwrap();
  s.insert_marker("a", &marker("m1")).await.unwrap();

  let plain = s
    .search_faces(&FaceSearchQuery { id: Some("a".into()), ..Default::default() })
    .await
    .unwrap();
  assert!(plain.faces[0].markers.is_none());

  let with = s.search_faces(&FaceSearchQuery::by_id("a")).await.unwrap();
  let markers = with.faces[0].markers.as_ref().unwrap();
  let uids: Vec<&str> = markers.iter().map(|m| m.uid.as_str()).collect();
  assert_eq!(uids, ["m1", "m2"]);
}

#[tokio::test]
async fn search_filters_by_subject_and_unknown() {
  let s = seeded().await;
  s.set_subject(face("b", 5), Some("subj001".into())).await.unwrap();

  let q = FaceSearchQuery { subject: Some("subj001".into()), ..Default::default() };
  assert_eq!(ids(&s.search_faces(&q).await.unwrap().faces), ["b"]);

  let q = FaceSearchQuery { unknown: true, ..Default::default() };
  assert_eq!(ids(&s.search_faces(&q).await.unwrap().faces), ["a", "c"]);
}

#[tokio::test]
async fn hidden_faces_need_the_flag_unless_addressed_by_id() {
  let s = store().await;
  s.insert_face(&face("visible", 2)).await.unwrap();
  s.insert_face(&Face { hidden: true, ..face("hidden", 3) }).await.unwrap();

  let res = s.search_faces(&FaceSearchQuery::default()).await.unwrap();
  assert_eq!(ids(&res.faces), ["visible"]);

  let q = FaceSearchQuery { hidden: true, ..Default::default() };
  assert_eq!(ids(&s.search_faces(&q).await.unwrap().faces), ["hidden", "visible"]);

  let res = s.search_faces(&FaceSearchQuery::by_id("hidden")).await.unwrap();
  assert_eq!(ids(&res.faces), ["hidden"]);
}

#[tokio::test]
async fn zero_count_means_max_results() {
  let s = store().await;
  for i in 0..(MAX_RESULTS + 5) {
    s.insert_face(&face(&format!("f{i:05}"), 1)).await.unwrap();
  }
  let res = s.search_faces(&FaceSearchQuery::default()).await.unwrap();
  assert_eq!(res.faces.len(), MAX_RESULTS);
  assert_eq!(res.total, MAX_RESULTS + 5);
}

// ─── Repository ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn find_face_missing_returns_none() {
  let s = seeded().await;
  assert!(s.find_face("nope").await.unwrap().is_none());
  assert_eq!(s.find_face("a").await.unwrap().unwrap().samples, 9);
}

#[tokio::test]
async fn set_subject_links_face_and_markers() {
  let s = seeded().await;
  s.insert_marker("a", &marker("m1")).await.unwrap();

  let before = s.find_face("a").await.unwrap().unwrap();
  let after = s.set_subject(before.clone(), Some("subj001".into())).await.unwrap();

  assert_eq!(after.id, "a");
  assert_eq!(after.subj_uid.as_deref(), Some("subj001"));
  assert!(after.updated_at > before.updated_at);

  let stored = s.search_faces(&FaceSearchQuery::by_id("a")).await.unwrap();
  let stored = &stored.faces[0];
  assert_eq!(stored.subj_uid.as_deref(), Some("subj001"));
  assert_eq!(
    stored.markers.as_ref().unwrap()[0].subj_uid.as_deref(),
    Some("subj001")
  );
}

#[tokio::test]
async fn set_subject_none_unlinks() {
  let s = seeded().await;
  let f = s.find_face("a").await.unwrap().unwrap();
  let f = s.set_subject(f, Some("subj001".into())).await.unwrap();
  let f = s.set_subject(f, None).await.unwrap();
  assert_eq!(f.subj_uid, None);
}

#[tokio::test]
async fn set_subject_unknown_subject_fails_and_leaves_face_unchanged() {
  let s = seeded().await;
  let f = s.find_face("a").await.unwrap().unwrap();

  let err = s.set_subject(f, Some("ghost".into())).await.unwrap_err();
  assert!(matches!(err, Error::Database(_)), "{err}");

  let stored = s.find_face("a").await.unwrap().unwrap();
  assert_eq!(stored.subj_uid, None);
}

#[tokio::test]
async fn set_subject_on_vanished_face_is_not_found() {
  let s = seeded().await;
  let err = s.set_subject(face("gone", 1), None).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Core(mien_core::Error::FaceNotFound(ref id)) if id == "gone"
  ));
}

// ─── Sessions ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn resolve_known_and_unknown_tokens() {
  let s = store().await;
  let session = Session {
    user_uid:      "uqxetse3cy5eo9z2".into(),
    permissions:   vec![Permission::new(Resource::Faces, Action::Read)],
    expires_at:    Some(Utc::now() + Duration::hours(1)),
    preview_token: Some("prev123".into()),
  };
  s.insert_session("token-1", &session).await.unwrap();

  let got = s.resolve("token-1").await.unwrap().unwrap();
  assert_eq!(got.user_uid, session.user_uid);
  assert_eq!(got.permissions, session.permissions);
  assert_eq!(got.preview_token.as_deref(), Some("prev123"));
  assert!(got.expires_at.is_some());

  assert!(s.resolve("token-2").await.unwrap().is_none());
}
