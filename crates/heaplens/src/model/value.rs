//! Attribute and reference values

use crate::model::object::ObjRef;

/// A value held in an object attribute, container slot, or binding.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absent value
    Null,
    /// Boolean
    Bool(bool),
    /// Signed integer
    Int(i64),
    /// Double-precision float
    Float(f64),
    /// Text string
    Str(String),
    /// Raw byte buffer
    Bytes(Vec<u8>),
    /// Exact decimal, kept in text form
    Decimal(String),
    /// Rational number
    Rational {
        /// Numerator
        num: i64,
        /// Denominator
        den: i64,
    },
    /// Complex number
    Complex {
        /// Real part
        re: f64,
        /// Imaginary part
        im: f64,
    },
    /// Lazy integer range, materialized only on demand
    Range {
        /// First element
        start: i64,
        /// Exclusive upper (or lower, for negative steps) bound
        stop: i64,
        /// Stride between elements
        step: i64,
    },
    /// Reference to a tracked heap object
    Ref(ObjRef),
}

impl Value {
    /// Approximate footprint of this value in bytes, counting owned
    /// payload but not referenced objects.
    pub fn shallow_size(&self) -> usize {
        let inline = std::mem::size_of::<Value>();
        match self {
            Value::Str(s) => inline + s.capacity(),
            Value::Bytes(b) => inline + b.capacity(),
            Value::Decimal(d) => inline + d.capacity(),
            _ => inline,
        }
    }
}

/// Materialize at most `limit` leading elements of a lazy integer range.
///
/// A zero step yields no elements; steps that would overflow stop early.
pub fn range_elements(start: i64, stop: i64, step: i64, limit: usize) -> Vec<i64> {
    let mut out = Vec::new();
    if step == 0 {
        return out;
    }
    let mut cur = start;
    while out.len() < limit {
        if (step > 0 && cur >= stop) || (step < 0 && cur <= stop) {
            break;
        }
        out.push(cur);
        cur = match cur.checked_add(step) {
            Some(next) => next,
            None => break,
        };
    }
    out
}
