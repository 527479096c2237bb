//! CPU-side uniform model.
//!
//! - [`UniformSet`]: ordered `(name, value)` list (plugin defaults, per-object overrides)
//! - [`UniformLayout`]: reflected uniform block of a compiled program
//! - [`UniformTable`]: the live uniform block, validated against its layout

use std::fmt;

use super::error::UniformError;

/// Shape of a single uniform slot.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum UniformKind {
    Float,
    Vec2,
    Vec3,
    Vec4,
    Int,
    UInt,
}

impl UniformKind {
    /// Byte size of the value (not including trailing struct padding).
    #[inline]
    pub const fn size(self) -> u32 {
        match self {
            UniformKind::Float | UniformKind::Int | UniformKind::UInt => 4,
            UniformKind::Vec2 => 8,
            UniformKind::Vec3 => 12,
            UniformKind::Vec4 => 16,
        }
    }
}

impl fmt::Display for UniformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UniformKind::Float => "f32",
            UniformKind::Vec2 => "vec2<f32>",
            UniformKind::Vec3 => "vec3<f32>",
            UniformKind::Vec4 => "vec4<f32>",
            UniformKind::Int => "i32",
            UniformKind::UInt => "u32",
        };
        f.write_str(s)
    }
}

/// A value that can be written into a uniform slot.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    Int(i32),
    UInt(u32),
}

impl UniformValue {
    #[inline]
    pub const fn kind(&self) -> UniformKind {
        match self {
            UniformValue::Float(_) => UniformKind::Float,
            UniformValue::Vec2(_) => UniformKind::Vec2,
            UniformValue::Vec3(_) => UniformKind::Vec3,
            UniformValue::Vec4(_) => UniformKind::Vec4,
            UniformValue::Int(_) => UniformKind::Int,
            UniformValue::UInt(_) => UniformKind::UInt,
        }
    }

    /// Zero of the given kind.
    pub const fn zero(kind: UniformKind) -> Self {
        match kind {
            UniformKind::Float => UniformValue::Float(0.0),
            UniformKind::Vec2 => UniformValue::Vec2([0.0; 2]),
            UniformKind::Vec3 => UniformValue::Vec3([0.0; 3]),
            UniformKind::Vec4 => UniformValue::Vec4([0.0; 4]),
            UniformKind::Int => UniformValue::Int(0),
            UniformKind::UInt => UniformValue::UInt(0),
        }
    }

    fn write_to(&self, out: &mut [u8]) {
        let bytes: &[u8] = match self {
            UniformValue::Float(v) => bytemuck::bytes_of(v),
            UniformValue::Vec2(v) => bytemuck::cast_slice(v),
            UniformValue::Vec3(v) => bytemuck::cast_slice(v),
            UniformValue::Vec4(v) => bytemuck::cast_slice(v),
            UniformValue::Int(v) => bytemuck::bytes_of(v),
            UniformValue::UInt(v) => bytemuck::bytes_of(v),
        };
        out[..bytes.len()].copy_from_slice(bytes);
    }
}

impl From<f32> for UniformValue {
    fn from(v: f32) -> Self {
        UniformValue::Float(v)
    }
}

impl From<[f32; 2]> for UniformValue {
    fn from(v: [f32; 2]) -> Self {
        UniformValue::Vec2(v)
    }
}

impl From<[f32; 3]> for UniformValue {
    fn from(v: [f32; 3]) -> Self {
        UniformValue::Vec3(v)
    }
}

impl From<[f32; 4]> for UniformValue {
    fn from(v: [f32; 4]) -> Self {
        UniformValue::Vec4(v)
    }
}

impl From<i32> for UniformValue {
    fn from(v: i32) -> Self {
        UniformValue::Int(v)
    }
}

impl From<u32> for UniformValue {
    fn from(v: u32) -> Self {
        UniformValue::UInt(v)
    }
}

// ── UniformSet ────────────────────────────────────────────────────────────

/// Ordered list of named uniform values.
///
/// Setting a name that is already present replaces its value and keeps its
/// position, so iteration order is first-insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UniformSet {
    entries: Vec<(String, UniformValue)>,
}

impl UniformSet {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`set`](Self::set).
    pub fn with(mut self, name: impl Into<String>, value: impl Into<UniformValue>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<UniformValue>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<UniformValue> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, UniformValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), *v))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<N, V> FromIterator<(N, V)> for UniformSet
where
    N: Into<String>,
    V: Into<UniformValue>,
{
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut set = UniformSet::new();
        for (name, value) in iter {
            set.set(name, value);
        }
        set
    }
}

// ── UniformLayout ─────────────────────────────────────────────────────────

/// One member of a uniform block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformSlot {
    pub name: String,
    pub offset: u32,
    pub kind: UniformKind,
}

/// Byte layout of a program's uniform block.
///
/// An empty layout (no block declared) has `size == 0`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UniformLayout {
    slots: Vec<UniformSlot>,
    size: u32,
}

impl UniformLayout {
    pub fn new(size: u32) -> Self {
        Self { slots: Vec::new(), size }
    }

    /// Appends a slot. The slot must fit inside the block.
    pub fn push(&mut self, name: impl Into<String>, offset: u32, kind: UniformKind) {
        debug_assert!(offset + kind.size() <= self.size, "uniform slot outside block");
        self.slots.push(UniformSlot {
            name: name.into(),
            offset,
            kind,
        });
    }

    pub fn with(mut self, name: impl Into<String>, offset: u32, kind: UniformKind) -> Self {
        self.push(name, offset, kind);
        self
    }

    #[inline]
    pub fn size(&self) -> u32 {
        self.size
    }

    #[inline]
    pub fn slots(&self) -> &[UniformSlot] {
        &self.slots
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.slots.iter().position(|s| s.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }
}

// ── UniformTable ──────────────────────────────────────────────────────────

/// Live uniform block of a compiled program.
///
/// Holds the typed last-written value of every slot plus the byte image that
/// is uploaded before each draw. Values persist until overwritten or until the
/// table is rebuilt on the next context init.
#[derive(Debug, Clone)]
pub struct UniformTable {
    layout: UniformLayout,
    values: Vec<UniformValue>,
    bytes: Vec<u8>,
}

impl UniformTable {
    pub fn new(layout: UniformLayout) -> Self {
        let values = layout
            .slots()
            .iter()
            .map(|s| UniformValue::zero(s.kind))
            .collect();
        let bytes = vec![0u8; layout.size() as usize];
        Self {
            layout,
            values,
            bytes,
        }
    }

    #[inline]
    pub fn layout(&self) -> &UniformLayout {
        &self.layout
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.layout.contains(name)
    }

    /// Writes `value` into the slot called `name`.
    ///
    /// Fails if the program declares no such uniform or if its kind differs.
    pub fn set(&mut self, name: &str, value: UniformValue) -> Result<(), UniformError> {
        let index = self.check(name, value)?;
        self.write(index, value);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<UniformValue> {
        self.layout.position(name).map(|i| self.values[i])
    }

    /// Applies every entry of `set` in order.
    ///
    /// All entries are checked first; on failure the table is unchanged.
    pub fn apply(&mut self, set: &UniformSet) -> Result<(), UniformError> {
        let checked = set
            .iter()
            .map(|(name, value)| self.check(name, value).map(|i| (i, value)))
            .collect::<Result<Vec<_>, _>>()?;
        for (index, value) in checked {
            self.write(index, value);
        }
        Ok(())
    }

    /// Slot index for `name`, if `value` may be written there.
    fn check(&self, name: &str, value: UniformValue) -> Result<usize, UniformError> {
        let index = self
            .layout
            .position(name)
            .ok_or_else(|| UniformError::Unknown {
                name: name.to_string(),
            })?;

        let kind = self.layout.slots()[index].kind;
        if kind != value.kind() {
            return Err(UniformError::KindMismatch {
                name: name.to_string(),
                expected: kind,
                found: value.kind(),
            });
        }
        Ok(index)
    }

    fn write(&mut self, index: usize, value: UniformValue) {
        let slot = &self.layout.slots()[index];
        let start = slot.offset as usize;
        let end = start + slot.kind.size() as usize;
        value.write_to(&mut self.bytes[start..end]);
        self.values[index] = value;
    }

    /// Byte image of the uniform block (`layout().size()` bytes).
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}
