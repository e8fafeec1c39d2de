//! Grouping of release notes into changelog entries.
//!
//! Notes written on the same day by the same author with the same tag are
//! folded into one entry. Entries are ordered by their newest note.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::model::{NoteTag, ReleaseNote};

/// One changelog entry: notes sharing tag, author and calendar day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteGroup {
    key: String,
    lead: ReleaseNote,
    rest: Vec<ReleaseNote>,
}

impl NoteGroup {
    fn new(key: String, lead: ReleaseNote) -> Self {
        Self {
            key,
            lead,
            rest: Vec::new(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// The newest note, which supplies the entry's tag, author and date.
    pub fn lead(&self) -> &ReleaseNote {
        &self.lead
    }

    pub fn tag(&self) -> NoteTag {
        self.lead.tag
    }

    /// Members, newest first.
    pub fn notes(&self) -> impl Iterator<Item = &ReleaseNote> {
        std::iter::once(&self.lead).chain(&self.rest)
    }
}

/// `tag-author-date`, with the date taken literally from the timestamp.
pub fn group_key(note: &ReleaseNote) -> String {
    format!(
        "{}-{}-{}",
        note.tag.as_str(),
        note.author_name,
        note.created_at.date_part()
    )
}

/// Newest first. Unparseable timestamps sort after every parseable one.
fn newest_first(a: &ReleaseNote, b: &ReleaseNote) -> Ordering {
    match (a.created_at.instant(), b.created_at.instant()) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Notes sorted newest first; ties keep their input order.
pub fn sort_newest_first(notes: &[ReleaseNote]) -> Vec<ReleaseNote> {
    let mut sorted = notes.to_vec();
    sorted.sort_by(newest_first);
    sorted
}

/// Group notes into entries.
///
/// Groups appear in the order their first (newest) member is met in the
/// sorted list; members stay newest first.
pub fn group_notes(notes: &[ReleaseNote]) -> Vec<NoteGroup> {
    let mut groups: Vec<NoteGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for note in sort_newest_first(notes) {
        let key = group_key(&note);
        match index.get(&key) {
            Some(&slot) => groups[slot].rest.push(note),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push(NoteGroup::new(key, note));
            }
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NoteTimestamp;

    fn note(id: &str, tag: NoteTag, author: &str, at: &str) -> ReleaseNote {
        ReleaseNote {
            id: id.to_string(),
            description: format!("note {id}"),
            tag,
            component_set_id: "1:1".to_string(),
            component_set_name: "Button".to_string(),
            created_at: NoteTimestamp::new(at),
            author_id: author.to_lowercase(),
            author_name: author.to_string(),
        }
    }

    fn ids(group: &NoteGroup) -> Vec<&str> {
        group.notes().map(|n| n.id.as_str()).collect()
    }

    #[test]
    fn empty_input_yields_no_groups() {
        assert!(group_notes(&[]).is_empty());
    }

    #[test]
    fn lead_is_newest_member() {
        let notes = vec![
            note("old", NoteTag::Deleted, "Ann", "2024-01-02T08:00:00Z"),
            note("new", NoteTag::Deleted, "Ann", "2024-01-02T18:00:00Z"),
        ];
        let groups = group_notes(&notes);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].key(), "deleted-Ann-2024-01-02");
        assert_eq!(groups[0].lead().id, "new");
        assert_eq!(groups[0].tag(), NoteTag::Deleted);
        assert_eq!(ids(&groups[0]), vec!["new", "old"]);
    }

    #[test]
    fn groups_by_tag_author_and_day() {
        let notes = vec![
            note("1", NoteTag::BugFix, "Ann", "2024-01-02T10:00:00Z"),
            note("2", NoteTag::BugFix, "Ann", "2024-01-02T15:00:00Z"),
            note("3", NoteTag::Enhancement, "Bo", "2024-01-01T09:00:00Z"),
        ];

        let groups = group_notes(&notes);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key, "bug_fix-Ann-2024-01-02");
        assert_eq!(ids(&groups[0]), vec!["2", "1"]);
        assert_eq!(groups[1].key, "enhancement-Bo-2024-01-01");
        assert_eq!(ids(&groups[1]), vec!["3"]);
    }

    #[test]
    fn identical_keys_collapse_into_one_group() {
        let notes = vec![
            note("a", NoteTag::Deleted, "Cy", "2024-03-05T08:00:00Z"),
            note("b", NoteTag::Deleted, "Cy", "2024-03-05T12:00:00Z"),
            note("c", NoteTag::Deleted, "Cy", "2024-03-05T09:30:00Z"),
        ];
        let groups = group_notes(&notes);
        assert_eq!(groups.len(), 1);
        assert_eq!(ids(&groups[0]), vec!["b", "c", "a"]);
    }

    #[test]
    fn group_position_follows_newest_member() {
        let notes = vec![
            note("old-fix", NoteTag::BugFix, "Ann", "2024-01-02T08:00:00Z"),
            note("enh", NoteTag::Enhancement, "Ann", "2024-01-02T09:00:00Z"),
            note("new-fix", NoteTag::BugFix, "Ann", "2024-01-02T10:00:00Z"),
        ];
        let groups = group_notes(&notes);
        assert_eq!(groups[0].key, "bug_fix-Ann-2024-01-02");
        assert_eq!(ids(&groups[0]), vec!["new-fix", "old-fix"]);
        assert_eq!(groups[1].key, "enhancement-Ann-2024-01-02");
    }

    #[test]
    fn ties_keep_input_order_and_are_stable() {
        let notes = vec![
            note("x", NoteTag::BugFix, "Ann", "2024-01-02T10:00:00Z"),
            note("y", NoteTag::BugFix, "Ann", "2024-01-02T10:00:00Z"),
            note("z", NoteTag::NewComponent, "Bo", "2024-01-02T10:00:00Z"),
        ];
        let first = group_notes(&notes);
        let second = group_notes(&notes);
        assert_eq!(first, second);
        assert_eq!(ids(&first[0]), vec!["x", "y"]);
        assert_eq!(first[1].key, "new_component-Bo-2024-01-02");
    }

    #[test]
    fn offsets_compare_by_instant_but_group_by_literal_date() {
        let notes = vec![
            // 2024-01-03T04:30Z as an instant, but written on Jan 2nd locally.
            note("late", NoteTag::BugFix, "Ann", "2024-01-02T23:30:00-05:00"),
            note("early", NoteTag::BugFix, "Ann", "2024-01-03T01:00:00Z"),
        ];
        let groups = group_notes(&notes);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key, "bug_fix-Ann-2024-01-02");
        assert_eq!(groups[1].key, "bug_fix-Ann-2024-01-03");
    }

    #[test]
    fn unparseable_timestamps_sort_last() {
        let notes = vec![
            note("bad", NoteTag::BugFix, "Ann", "not a date"),
            note("good", NoteTag::BugFix, "Ann", "2020-01-01T00:00:00Z"),
        ];
        let sorted = sort_newest_first(&notes);
        assert_eq!(sorted[0].id, "good");
        assert_eq!(sorted[1].id, "bad");
    }
}
