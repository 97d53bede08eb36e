#![forbid(unsafe_code)]

//! Knuth-Plass paragraph breaking and line setting.
//!
//! An external producer turns a paragraph into an ordered stream of
//! [`Item`]s (boxes, glue, penalties). This crate finds the breakpoint
//! sequence minimizing badness-derived demerits against per-line target
//! lengths, then sets each resulting line by distributing its slack across
//! the line's elastic items:
//!
//! - [`ItemList`]: the item stream with O(1) range metrics.
//! - [`LineLengths`]: per-line target lengths, collapsible by pseudo-index.
//! - [`OptimalityCriteria`] / [`TexOptimalityCriteria`]: the cost model.
//! - [`search`]: the active-node dynamic program over breakpoints.
//! - [`set_line`]: glue distribution into final rendered widths.
//!
//! The whole pipeline is a pure, single-threaded computation over immutable
//! input; running separate paragraphs on separate threads needs no
//! synchronization.
//!
//! # Example
//! ```
//! use galley_break::{
//!     ConstantLineLengths, Distance, Item, ItemList, TexOptimalityCriteria, search, set_line,
//! };
//!
//! let items = ItemList::new(vec![
//!     Item::boxed(60),
//!     Item::glue(20, 7, 20),
//!     Item::boxed(60),
//!     Item::glue(20, 7, 20),
//!     Item::boxed(60),
//!     Item::glue(20, 7, 20),
//!     Item::boxed(60),
//!     Item::glue(0, 0, 100_000),
//!     Item::forced_break(),
//! ]);
//! let lengths = ConstantLineLengths::new(270);
//! let criteria = TexOptimalityCriteria::PERMISSIVE;
//!
//! let breakpoints = search(&items, &lengths, &criteria)?;
//! assert_eq!(breakpoints, vec![5, 8]);
//!
//! // Set the first line: items up to and including breakpoint 5.
//! let first = set_line(&items.slice(0, 6), Distance::from_sp(270));
//! assert!(first.is_clean());
//! assert_eq!(first.visible_width(), Distance::from_sp(270));
//! # Ok::<(), galley_break::NoSolution>(())
//! ```

pub mod breaker;
pub mod criteria;
pub mod item;
pub mod item_list;
pub mod line_lengths;
pub mod setter;

pub use galley_units::{Distance, Ratio};

pub use breaker::{BreakpointNode, NoSolution, SearchObserver, search, search_with_observer};
pub use criteria::{
    Demerits, FitnessClass, INFINITE_BADNESS, OptimalityCriteria, TexOptimalityCriteria, badness,
    ratio_badness,
};
pub use item::{INFINITE_PENALTY, INFINITE_STRETCH, Item};
pub use item_list::{ItemList, LineMetrics};
pub use line_lengths::{ConstantLineLengths, LineLengths, VariableLineLengths};
pub use setter::{FixedItem, LineSettingError, SetLineResult, set_line};
