/// Completed edit a child editing view-model reports back to its parent.
///
/// The child receives an `UnboundedSender<ItemEditEvent<T>>` at
/// construction and the parent owns the receiver, folding the events
/// into its snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemEditEvent<T> {
    Appended(T),
    Replaced { index: usize, item: T },
    Deleted { index: usize },
}

/// Folds an event into an ordered list. Out-of-range indices are ignored.
pub fn apply_to<T>(list: &mut Vec<T>, event: ItemEditEvent<T>) {
    match event {
        ItemEditEvent::Appended(item) => list.push(item),
        ItemEditEvent::Replaced { index, item } => {
            if index < list.len() {
                list[index] = item;
            }
        }
        ItemEditEvent::Deleted { index } => {
            if index < list.len() {
                list.remove(index);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_grows_the_list() {
        let mut list = vec!["a"];
        apply_to(&mut list, ItemEditEvent::Appended("b"));
        assert_eq!(list, vec!["a", "b"]);
    }

    #[test]
    fn replace_swaps_in_place() {
        let mut list = vec!["a", "b", "c"];
        apply_to(&mut list, ItemEditEvent::Replaced { index: 1, item: "x" });
        assert_eq!(list, vec!["a", "x", "c"]);
    }

    #[test]
    fn delete_keeps_remaining_order() {
        let mut list = vec![0, 1, 2, 3, 4];
        apply_to(&mut list, ItemEditEvent::Deleted { index: 2 });
        assert_eq!(list, vec![0, 1, 3, 4]);
    }

    #[test]
    fn out_of_range_indices_are_ignored() {
        let mut list = vec!["a"];
        apply_to(&mut list, ItemEditEvent::Replaced { index: 5, item: "x" });
        apply_to(&mut list, ItemEditEvent::Deleted { index: 5 });
        assert_eq!(list, vec!["a"]);
    }
}
