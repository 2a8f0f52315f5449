use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Bit width of a value: `+n` is unsigned, `-n` signed, `1` boolean and `0`
/// the "no value" sentinel used for absent operands.
pub type Width = i32;

/// Opaque handle to the front-end declaration a value originated from.
pub type DeclId = u32;

/// Fresh random names start at `r10`; `r1`..`r9` stay available to input
/// programs as declared random parameters.
pub const RESERVED_RANDOM_BASE: usize = 10;

static NEXT_RANDOM: AtomicUsize = AtomicUsize::new(RESERVED_RANDOM_BASE);

/// Resets the fresh-random allocator. Must be called between compilations.
pub fn reset_fresh_randoms() {
    NEXT_RANDOM.store(RESERVED_RANDOM_BASE, Ordering::SeqCst);
}

/// Whether a declared identifier collides with a name the compiler may
/// introduce: `r<N>` with N at or above the fresh-random base, or the
/// solver pass's `z3_` temporaries. A numeric suffix too large to parse
/// still collides once the allocation counter wraps.
pub fn is_reserved_name(name: &str) -> bool {
    if name.starts_with("z3_") {
        return true;
    }
    if name.len() > 1 && name.starts_with('r') {
        let rest = &name[1..];
        if rest.bytes().all(|b| b.is_ascii_digit()) {
            return match rest.parse::<usize>() {
                Ok(n) => n >= RESERVED_RANDOM_BASE,
                Err(_) => true,
            };
        }
    }
    false
}

/// Masking property of a value.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum VProp {
    /// Intermediate with no proved property.
    Unk,
    /// Intermediate that is provably masked.
    Masked,
    /// Public input parameter.
    Pub,
    /// Freshly drawn random bit, independent of all other values.
    Rnd,
    /// Literal constant.
    Cst,
    /// Secret input parameter.
    Secret,
    /// Function return or pointer-out parameter.
    Output,
}

impl fmt::Display for VProp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let text = match self {
            VProp::Unk => "UNK",
            VProp::Masked => "MASKED",
            VProp::Pub => "PUB",
            VProp::Rnd => "RND",
            VProp::Cst => "CST",
            VProp::Secret => "SECRET",
            VProp::Output => "OUTPUT",
        };
        f.write_str(text)
    }
}

/// A symbolic value identity: name, width, masking property and (for values
/// the front end declared) the originating declaration.
#[derive(Clone, Debug, Eq)]
pub struct ValueInfo {
    pub name: String,
    pub width: Width,
    pub prop: VProp,
    pub origin: Option<DeclId>,
}

impl ValueInfo {
    pub fn new(name: impl Into<String>, width: Width, prop: VProp) -> ValueInfo {
        ValueInfo {
            name: name.into(),
            width,
            prop,
            origin: None,
        }
    }

    pub fn with_origin(name: impl Into<String>, width: Width, prop: VProp, origin: DeclId) -> ValueInfo {
        ValueInfo {
            origin: Some(origin),
            ..ValueInfo::new(name, width, prop)
        }
    }

    /// The absent-operand sentinel.
    pub fn none() -> ValueInfo {
        ValueInfo::new("", 0, VProp::Unk)
    }

    /// A literal constant operand; `text` is its decimal rendering.
    pub fn literal(text: impl Into<String>) -> ValueInfo {
        ValueInfo::new(text, 1, VProp::Cst)
    }

    pub fn is_none(&self) -> bool {
        self.width == 0 && self.prop == VProp::Unk && self.origin.is_none()
    }

    /// Draws a fresh random bit. Names are unique process-wide until the
    /// allocator is reset.
    pub fn fresh_random() -> ValueInfo {
        let id = NEXT_RANDOM.fetch_add(1, Ordering::SeqCst);
        ValueInfo::new(format!("r{}", id), 1, VProp::Rnd)
    }
}

impl PartialEq for ValueInfo {
    fn eq(&self, other: &ValueInfo) -> bool {
        self.name == other.name
            && self.origin == other.origin
            && self.width == other.width
            && self.prop == other.prop
    }
}

impl Hash for ValueInfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self.origin {
            Some(id) => id.hash(state),
            None => self.name.len().hash(state),
        }
    }
}

impl fmt::Display for ValueInfo {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{{Name: {}, Width: {}, Prop: {}}}",
            self.name, self.width, self.prop
        )
    }
}
