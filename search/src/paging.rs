use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum SortBy {
    Score,
    SourceTag,
    TargetTag,
    MatchedFeatures,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum SortOrder {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paging {
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
    pub per_page: usize,
    pub page_number: usize,
}

/// Natural-order comparison of locus-like strings so `"1.9"` sorts
/// before `"1.10"`: runs of digits compare numerically, everything
/// else compares byte-for-byte.
pub fn natural_cmp(a: &str, b: &str) -> std::cmp::Ordering {
    let mut a_chars = a.chars().peekable();
    let mut b_chars = b.chars().peekable();

    loop {
        match (a_chars.peek(), b_chars.peek()) {
            (None, None) => return std::cmp::Ordering::Equal,
            (None, Some(_)) => return std::cmp::Ordering::Less,
            (Some(_), None) => return std::cmp::Ordering::Greater,
            (Some(ca), Some(cb)) => {
                if ca.is_ascii_digit() && cb.is_ascii_digit() {
                    let na = take_number(&mut a_chars);
                    let nb = take_number(&mut b_chars);
                    match na.cmp(&nb) {
                        std::cmp::Ordering::Equal => continue,
                        other => return other,
                    }
                } else {
                    let (ca, cb) = (*ca, *cb);
                    a_chars.next();
                    b_chars.next();
                    match ca.cmp(&cb) {
                        std::cmp::Ordering::Equal => continue,
                        other => return other,
                    }
                }
            }
        }
    }
}

fn take_number(chars: &mut std::iter::Peekable<std::str::Chars>) -> u64 {
    let mut n: u64 = 0;
    while let Some(c) = chars.peek() {
        if let Some(d) = c.to_digit(10) {
            n = n * 10 + d as u64;
            chars.next();
        } else {
            break;
        }
    }
    n
}

/// Applies sort order and pagination to a slice of items. `items` is
/// expected to arrive in score-descending order (how the store holds
/// them per §5); when `sort_by = score` that order is reused as-is
/// rather than resorted, matching "sort is pushed to the store" — only
/// an ascending request reverses it. For any other `sort_by`, items are
/// sorted in natural order by `key` and then reversed for descending.
pub fn paginate<T: Clone>(mut items: Vec<T>, paging: &Paging, key: impl Fn(&T, SortBy) -> String) -> Vec<T> {
    if paging.sort_by == SortBy::Score {
        if paging.sort_order == SortOrder::Ascending {
            items.reverse();
        }
    } else {
        items.sort_by(|a, b| natural_cmp(&key(a, paging.sort_by), &key(b, paging.sort_by)));
        if paging.sort_order == SortOrder::Descending {
            items.reverse();
        }
    }
    let start = paging.page_number.saturating_mul(paging.per_page);
    items.into_iter().skip(start).take(paging.per_page).collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn natural_order_keeps_1_9_before_1_10() {
        assert_eq!(natural_cmp("1.9", "1.10"), std::cmp::Ordering::Less);
        assert_eq!(natural_cmp("1.10", "1.9"), std::cmp::Ordering::Greater);
        assert_eq!(natural_cmp("1.9", "1.9"), std::cmp::Ordering::Equal);
    }

    #[test]
    fn paginate_slices_by_page() {
        let items: Vec<i32> = (0..25).rev().collect();
        let paging = Paging { sort_by: SortBy::Score, sort_order: SortOrder::Descending, per_page: 10, page_number: 1 };
        let page = paginate(items, &paging, |_, _| String::new());
        assert_eq!(page, (5..15).rev().collect::<Vec<_>>());
    }

    #[test]
    fn paginate_score_ascending_reverses_the_canonical_descending_order() {
        let items: Vec<i32> = (0..5).rev().collect();
        let paging = Paging { sort_by: SortBy::Score, sort_order: SortOrder::Ascending, per_page: 5, page_number: 0 };
        let page = paginate(items, &paging, |_, _| String::new());
        assert_eq!(page, (0..5).collect::<Vec<_>>());
    }
}
