/// A field of an entity type: its in-memory name and its wire (JSON) name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    pub name: &'static str,
    pub wire: &'static str,
    /// Populated by the server only; readable but never sent.
    pub read_only: bool,
}

impl FieldDef {
    pub const fn new(name: &'static str, wire: &'static str) -> Self {
        Self {
            name,
            wire,
            read_only: false,
        }
    }

    pub const fn read_only(name: &'static str, wire: &'static str) -> Self {
        Self {
            name,
            wire,
            read_only: true,
        }
    }
}

/// Statically known shape of an entity type.
///
/// The key is kept apart from `fields`: it is assigned by the server and
/// can never be set by the caller.
#[derive(Debug)]
pub struct EntitySchema {
    pub name: &'static str,
    pub key: FieldDef,
    pub fields: &'static [FieldDef],
}

impl EntitySchema {
    pub fn field(&self, name: &str) -> Option<&'static FieldDef> {
        self.fields.iter().find(|def| def.name == name)
    }

    pub fn field_by_wire(&self, wire: &str) -> Option<&'static FieldDef> {
        self.fields.iter().find(|def| def.wire == wire)
    }

    /// The field definition if `name` may be assigned by the caller.
    pub fn settable(&self, name: &str) -> Option<&'static FieldDef> {
        self.field(name).filter(|def| !def.read_only)
    }
}
