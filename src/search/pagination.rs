use serde::Serialize;

/// Results the lookup API returns per page
pub const RESULTS_PER_PAGE: u64 = 10;

/// Number of page buttons shown at once
pub const DEFAULT_WINDOW_SIZE: u32 = 7;

/// Pages needed for `total_result_count` results
pub fn total_pages(total_result_count: u64) -> u32 {
    u32::try_from(total_result_count.div_ceil(RESULTS_PER_PAGE)).unwrap_or(u32::MAX)
}

/// Page numbers to render as buttons
///
/// With the default size of 7: every page when there are at most 7, the
/// first 7 while `current_page <= 4`, the last 7 once
/// `current_page > total_pages - 3`, otherwise `current_page - 3 ..= current_page + 3`.
/// The two boundary tests are deliberately asymmetric. An even `window_size`
/// puts the extra page after the current one.
pub fn compute_page_window(current_page: u32, total_pages: u32, window_size: u32) -> Vec<u32> {
    let before = window_size.saturating_sub(1) / 2;
    let after = window_size.saturating_sub(1) - before;

    if total_pages <= window_size {
        (1..=total_pages).collect()
    } else if current_page <= before + 1 {
        (1..=window_size).collect()
    } else if current_page > total_pages - after {
        (total_pages - window_size + 1..=total_pages).collect()
    } else {
        (current_page - before..=current_page + after).collect()
    }
}

/// Page reached by "next"; stays put on the last page
pub fn next_page(current_page: u32, total_pages: u32) -> u32 {
    current_page.saturating_add(1).min(total_pages.max(1))
}

/// Page reached by "prev"; stays put on the first page
pub fn prev_page(current_page: u32) -> u32 {
    current_page.saturating_sub(1).max(1)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageButton {
    pub number: u32,
    pub is_current: bool,
}

/// Everything needed to draw the pagination bar
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginationControls {
    pub pages: Vec<PageButton>,
    pub prev_disabled: bool,
    pub next_disabled: bool,
}

impl PaginationControls {
    pub fn new(current_page: u32, total_pages: u32) -> Self {
        let pages = compute_page_window(current_page, total_pages, DEFAULT_WINDOW_SIZE)
            .into_iter()
            .map(|number| PageButton {
                number,
                is_current: number == current_page,
            })
            .collect();

        Self {
            pages,
            prev_disabled: current_page <= 1,
            next_disabled: current_page >= total_pages,
        }
    }

    pub fn page_numbers(&self) -> Vec<u32> {
        self.pages.iter().map(|p| p.number).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(current: u32, total: u32) -> Vec<u32> {
        compute_page_window(current, total, DEFAULT_WINDOW_SIZE)
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0), 0);
        assert_eq!(total_pages(1), 1);
        assert_eq!(total_pages(10), 1);
        assert_eq!(total_pages(25), 3);
        assert_eq!(total_pages(2000), 200);
    }

    #[test]
    fn test_small_totals_show_every_page() {
        for total in 0..=DEFAULT_WINDOW_SIZE {
            let expected: Vec<u32> = (1..=total).collect();
            for current in 1..=total.max(1) {
                assert_eq!(window(current, total), expected, "page {current} of {total}");
            }
        }
    }

    #[test]
    fn test_no_pages_gives_empty_window() {
        assert!(window(1, 0).is_empty());
        assert!(window(5, 0).is_empty());
    }

    #[test]
    fn test_leading_window() {
        for current in 1..=4 {
            assert_eq!(window(current, 200), vec![1, 2, 3, 4, 5, 6, 7]);
        }
    }

    #[test]
    fn test_centered_window() {
        assert_eq!(window(5, 200), vec![2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(window(100, 200), vec![97, 98, 99, 100, 101, 102, 103]);
        assert_eq!(window(197, 200), vec![194, 195, 196, 197, 198, 199, 200]);
    }

    #[test]
    fn test_trailing_window() {
        for current in 198..=200 {
            assert_eq!(window(current, 200), vec![194, 195, 196, 197, 198, 199, 200]);
        }
    }

    #[test]
    fn test_asymmetric_boundaries_near_small_totals() {
        // Page 5 of 8 takes the centered branch, which lands on the last seven
        assert_eq!(window(5, 8), vec![2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(window(6, 8), vec![2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(window(4, 8), vec![1, 2, 3, 4, 5, 6, 7]);
        // Page 5 of 9 is centered
        assert_eq!(window(5, 9), vec![2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(window(7, 9), vec![3, 4, 5, 6, 7, 8, 9]);
    }

    #[test]
    fn test_window_invariants() {
        for total in 1..=40 {
            for current in 1..=total {
                let pages = window(current, total);
                assert!(pages.len() <= DEFAULT_WINDOW_SIZE as usize);
                assert!(pages.contains(&current), "page {current} of {total}");
                assert!(pages.windows(2).all(|w| w[1] == w[0] + 1));
                assert!(pages.iter().all(|p| (1..=total).contains(p)));
            }
        }
    }

    #[test]
    fn test_other_window_sizes_keep_their_length() {
        assert_eq!(compute_page_window(5, 20, 6), vec![3, 4, 5, 6, 7, 8]);
        assert_eq!(compute_page_window(3, 20, 6), vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(compute_page_window(18, 20, 6), vec![15, 16, 17, 18, 19, 20]);
        assert_eq!(compute_page_window(9, 20, 1), vec![9]);

        for size in 1..=10 {
            for total in 1..=30 {
                for current in 1..=total {
                    let pages = compute_page_window(current, total, size);
                    let case = format!("size {size}, page {current} of {total}");
                    assert_eq!(pages.len(), total.min(size) as usize, "{case}");
                    assert!(pages.contains(&current), "{case}");
                    assert!(pages.iter().all(|p| (1..=total).contains(p)));
                }
            }
        }
    }

    #[test]
    fn test_next_and_prev_clamp() {
        assert_eq!(next_page(3, 10), 4);
        assert_eq!(next_page(10, 10), 10);
        assert_eq!(prev_page(3), 2);
        assert_eq!(prev_page(1), 1);
    }

    #[test]
    fn test_controls_for_first_of_many_pages() {
        let controls = PaginationControls::new(1, total_pages(100));
        assert_eq!(controls.page_numbers(), vec![1, 2, 3, 4, 5, 6, 7]);
        assert!(controls.prev_disabled);
        assert!(!controls.next_disabled);
        assert!(controls.pages[0].is_current);
        assert!(controls.pages[1..].iter().all(|p| !p.is_current));
    }

    #[test]
    fn test_controls_on_last_page() {
        let controls = PaginationControls::new(3, 3);
        assert!(!controls.prev_disabled);
        assert!(controls.next_disabled);
    }
}
