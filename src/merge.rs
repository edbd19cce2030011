use crate::models::Record;
use chrono::{DateTime, Utc};

/// Version stamp used for reconciliation ordering. A record that was never
/// stamped (legacy row, partial write) sorts before anything stamped.
pub fn modified_at_or_epoch(record: &Record) -> DateTime<Utc> {
    record.last_modified_at.unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Fold a freshly fetched remote snapshot into the collection currently
/// held in memory, for a single entity kind.
///
/// The result keeps every id from either side exactly once:
/// - ids only in `local` survive untouched (unsynced creations),
/// - ids only in `remote` are appended (a teammate created them),
/// - ids in both keep whichever version has the strictly newer stamp,
///   with ties going to `local` so an in-flight edit is not clobbered by
///   a remote echo of itself.
///
/// Inputs are never mutated.
pub fn reconcile(local: &[Record], remote: &[Record]) -> Vec<Record> {
    let mut merged: Vec<Record> = local.to_vec();
    for incoming in remote {
        match merged.iter_mut().find(|existing| existing.id == incoming.id) {
            None => merged.push(incoming.clone()),
            Some(existing) => {
                if modified_at_or_epoch(incoming) > modified_at_or_epoch(existing) {
                    *existing = incoming.clone();
                }
            }
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::{modified_at_or_epoch, reconcile};
    use crate::models::{Record, RecordBody, TaskFields};
    use chrono::{DateTime, Utc};
    use std::collections::BTreeSet;

    fn task(id: &str, title: &str, stamp: Option<&str>) -> Record {
        Record {
            id: id.to_string(),
            workspace_id: "w1".to_string(),
            last_modified_at: stamp.map(|raw| {
                DateTime::parse_from_rfc3339(raw)
                    .expect("test stamp parses")
                    .with_timezone(&Utc)
            }),
            archived: false,
            body: RecordBody::Task(TaskFields {
                title: title.to_string(),
                ..Default::default()
            }),
        }
    }

    fn title_of(record: &Record) -> &str {
        match &record.body {
            RecordBody::Task(fields) => &fields.title,
            _ => panic!("expected a task"),
        }
    }

    #[test]
    fn newer_remote_version_wins() {
        let local = vec![task("t1", "Draft", Some("2024-01-01T10:00:00Z"))];
        let remote = vec![task("t1", "Final", Some("2024-01-01T11:00:00Z"))];
        let merged = reconcile(&local, &remote);
        assert_eq!(merged.len(), 1);
        assert_eq!(title_of(&merged[0]), "Final");
    }

    #[test]
    fn newer_local_version_survives() {
        let local = vec![task("t1", "Edited", Some("2024-01-01T12:00:00Z"))];
        let remote = vec![task("t1", "Stale", Some("2024-01-01T11:00:00Z"))];
        let merged = reconcile(&local, &remote);
        assert_eq!(title_of(&merged[0]), "Edited");
    }

    #[test]
    fn ties_favor_local() {
        let local = vec![task("t1", "Mine", Some("2024-01-01T10:00:00Z"))];
        let remote = vec![task("t1", "Echo", Some("2024-01-01T10:00:00Z"))];
        let merged = reconcile(&local, &remote);
        assert_eq!(title_of(&merged[0]), "Mine");
    }

    #[test]
    fn both_absent_stamps_favor_local() {
        let local = vec![task("t1", "Mine", None)];
        let remote = vec![task("t1", "Theirs", None)];
        let merged = reconcile(&local, &remote);
        assert_eq!(title_of(&merged[0]), "Mine");
    }

    #[test]
    fn absent_stamp_loses_to_any_present_stamp() {
        let local = vec![task("t1", "Unstamped", None)];
        let remote = vec![task("t1", "Stamped", Some("2000-01-01T00:00:00Z"))];
        let merged = reconcile(&local, &remote);
        assert_eq!(title_of(&merged[0]), "Stamped");
    }

    #[test]
    fn unsynced_local_record_survives_refresh() {
        let local = vec![
            task("t1", "Known", Some("2024-01-01T10:00:00Z")),
            task("t2", "Unsynced", Some("2024-01-02T09:00:00Z")),
        ];
        let remote = vec![task("t1", "Known", Some("2024-01-01T10:00:00Z"))];
        let merged = reconcile(&local, &remote);
        assert_eq!(merged.len(), 2);
        let unsynced = merged.iter().find(|r| r.id == "t2").expect("t2 kept");
        assert_eq!(unsynced, &local[1]);
    }

    #[test]
    fn remote_only_record_is_appended() {
        let local = vec![task("t1", "Mine", Some("2024-01-01T10:00:00Z"))];
        let remote = vec![
            task("t1", "Mine", Some("2024-01-01T10:00:00Z")),
            task("t3", "Teammate's", Some("2024-01-01T10:30:00Z")),
        ];
        let merged = reconcile(&local, &remote);
        assert_eq!(merged.len(), 2);
        assert!(merged.iter().any(|r| r.id == "t3"));
    }

    #[test]
    fn result_holds_union_of_ids_exactly_once() {
        let local = vec![
            task("a", "a", Some("2024-01-01T10:00:00Z")),
            task("b", "b", None),
        ];
        let remote = vec![
            task("b", "b2", Some("2024-01-01T10:00:00Z")),
            task("c", "c", None),
        ];
        let merged = reconcile(&local, &remote);
        let ids: Vec<&str> = merged.iter().map(|r| r.id.as_str()).collect();
        let unique: BTreeSet<&str> = ids.iter().copied().collect();
        assert_eq!(ids.len(), unique.len());
        assert_eq!(unique, BTreeSet::from(["a", "b", "c"]));
    }

    #[test]
    fn merging_the_same_snapshot_twice_is_idempotent() {
        let local = vec![
            task("a", "local-newer", Some("2024-02-01T00:00:00Z")),
            task("b", "local-only", None),
        ];
        let remote = vec![
            task("a", "remote-older", Some("2024-01-01T00:00:00Z")),
            task("c", "remote-only", Some("2024-01-15T00:00:00Z")),
        ];
        let once = reconcile(&local, &remote);
        let twice = reconcile(&once, &remote);
        assert_eq!(once, twice);
    }

    #[test]
    fn empty_local_yields_remote_deduped_in_first_occurrence_order() {
        let remote = vec![
            task("a", "first", Some("2024-01-01T00:00:00Z")),
            task("b", "b", None),
            task("a", "older-duplicate", None),
        ];
        let merged = reconcile(&[], &remote);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].id, "a");
        assert_eq!(title_of(&merged[0]), "first");
        assert_eq!(merged[1].id, "b");
    }

    #[test]
    fn inputs_are_not_mutated() {
        let local = vec![task("t1", "Draft", Some("2024-01-01T10:00:00Z"))];
        let remote = vec![task("t1", "Final", Some("2024-01-01T11:00:00Z"))];
        let local_before = local.clone();
        let remote_before = remote.clone();
        let _ = reconcile(&local, &remote);
        assert_eq!(local, local_before);
        assert_eq!(remote, remote_before);
    }

    #[test]
    fn epoch_fallback_orders_before_any_stamp() {
        let unstamped = task("x", "x", None);
        let stamped = task("y", "y", Some("1970-01-01T00:00:00Z"));
        assert!(modified_at_or_epoch(&unstamped) < modified_at_or_epoch(&stamped));
    }
}
