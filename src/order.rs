//! Reconciling ordered collections with externally reported id orders.
//!
//! Every draggable list (boards, categories, top-level tasks, sub-tasks)
//! synchronizes the same way: the drag surface reports the new order of its
//! children as a list of ids, and the owning collection re-derives its
//! element order from that list. Ids that match nothing are stale drag
//! artifacts and are skipped; elements the report fails to mention keep
//! their relative order behind the reported ones.

/// Reorder `items` in place to match `reported`.
pub fn reconcile_by_ids<T, F>(items: &mut Vec<T>, reported: &[String], id_of: F)
where
    F: Fn(&T) -> &str,
{
    let mut remaining = std::mem::take(items);
    let mut reordered = Vec::with_capacity(remaining.len());

    for id in reported {
        if let Some(position) = remaining.iter().position(|item| id_of(item) == id) {
            reordered.push(remaining.remove(position));
        }
    }

    reordered.extend(remaining);
    *items = reordered;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(items: &[(String, u32)]) -> Vec<&str> {
        items.iter().map(|(id, _)| id.as_str()).collect()
    }

    fn fixture() -> Vec<(String, u32)> {
        vec![
            ("a".to_string(), 1),
            ("b".to_string(), 2),
            ("c".to_string(), 3),
        ]
    }

    fn reported(order: &[&str]) -> Vec<String> {
        order.iter().map(|id| id.to_string()).collect()
    }

    #[test]
    fn test_reorders_to_reported_order() {
        let mut items = fixture();
        reconcile_by_ids(&mut items, &reported(&["c", "a", "b"]), |item| &item.0);
        assert_eq!(ids(&items), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_unknown_ids_are_dropped() {
        let mut items = fixture();
        reconcile_by_ids(
            &mut items,
            &reported(&["b", "ghost", "a", "c"]),
            |item| &item.0,
        );
        assert_eq!(ids(&items), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_unmentioned_items_keep_relative_order_at_tail() {
        let mut items = fixture();
        reconcile_by_ids(&mut items, &reported(&["c"]), |item| &item.0);
        assert_eq!(ids(&items), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_empty_report_is_a_no_op() {
        let mut items = fixture();
        reconcile_by_ids(&mut items, &[], |item| &item.0);
        assert_eq!(ids(&items), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_duplicate_ids_in_report_are_applied_once() {
        let mut items = fixture();
        reconcile_by_ids(&mut items, &reported(&["b", "b", "a"]), |item| &item.0);
        assert_eq!(ids(&items), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_round_trip_preserves_values() {
        let mut items = fixture();
        reconcile_by_ids(&mut items, &reported(&["b", "c", "a"]), |item| &item.0);
        let total: u32 = items.iter().map(|(_, value)| value).sum();
        assert_eq!(total, 6);
    }
}
