use parking_lot::Mutex;
use ulid::{Generator, Ulid};

static GENERATOR: Mutex<Option<Generator>> = parking_lot::const_mutex(None);

/// Next ULID from the process-wide monotonic generator. IDs minted within the
/// same millisecond still increase.
fn next_ulid() -> Ulid {
    let mut generator = GENERATOR.lock();
    generator
        .get_or_insert_with(Generator::new)
        .generate()
        .unwrap_or_else(|_| Ulid::new())
}

/// Generates a new ULID-based ID with the given prefix.
///
/// IDs are monotonic within the process, so documents keyed by them list in
/// insertion order.
///
/// # Examples
/// ```
/// let id = fastfood_common::id::prefixed_ulid("ord");
/// assert!(id.starts_with("ord_"));
/// ```
pub fn prefixed_ulid(prefix: &str) -> String {
    format!("{}_{}", prefix, next_ulid())
}

/// Well-known ID prefixes.
pub mod prefix {
    pub const USER: &str = "usr";
    pub const CATEGORY: &str = "cat";
    pub const MENU_ITEM: &str = "item";
    pub const OPTION: &str = "opt";
    pub const ORDER: &str = "ord";
}
