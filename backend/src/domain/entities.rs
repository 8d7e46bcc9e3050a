//! # Entity Descriptors
//!
//! One static descriptor per record kind. Validation, both storage backends
//! and the listing order are all driven from these tables, so the three
//! business modules share a single CRUD path instead of three copies of it.
//!
//! Field names are the persisted column names and double as the keys of the
//! form field maps sent by the shell.

use chrono::Local;
use std::fmt;

/// Format of store-assigned creation timestamps
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Current local time in [`TIMESTAMP_FORMAT`]
pub fn now_timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Purchase,
    Employee,
    Product,
    Lot,
    QualityControl,
}

impl EntityKind {
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Purchase,
        EntityKind::Employee,
        EntityKind::Product,
        EntityKind::Lot,
        EntityKind::QualityControl,
    ];

    pub fn descriptor(self) -> &'static EntityDescriptor {
        match self {
            EntityKind::Purchase => &PURCHASE,
            EntityKind::Employee => &EMPLOYEE,
            EntityKind::Product => &PRODUCT,
            EntityKind::Lot => &LOT,
            EntityKind::QualityControl => &QUALITY_CONTROL,
        }
    }

    /// Descriptors of every kind holding a reference to this one
    pub fn dependents(self) -> impl Iterator<Item = &'static EntityDescriptor> {
        EntityKind::ALL
            .into_iter()
            .map(EntityKind::descriptor)
            .filter(move |d| d.reference.is_some_and(|r| r.parent == self))
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EntityKind::Purchase => "purchase",
            EntityKind::Employee => "employee",
            EntityKind::Product => "product",
            EntityKind::Lot => "lot",
            EntityKind::QualityControl => "quality control",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// Trimmed and uppercased before any lookup or write
    Sku,
    Integer,
    /// Integer strictly greater than zero
    PositiveInteger,
    /// Finite floating point number
    Decimal,
    /// Stored as 0/1
    Flag,
    /// Filled in by the store at insert time, never read from input
    CreatedAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldSpec {
    pub const fn required(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind, required: true }
    }

    pub const fn optional(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind, required: false }
    }

    pub const fn created_at(name: &'static str) -> Self {
        Self { name, kind: FieldKind::CreatedAt, required: false }
    }

    pub fn is_input(&self) -> bool {
        self.kind != FieldKind::CreatedAt
    }
}

/// Creation-time link from a child row to its parent, checked before insert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference {
    /// Column on the child holding the parent key
    pub field: &'static str,
    pub parent: EntityKind,
    /// Column on the parent the value must match (`"id"` or a unique column)
    pub parent_key: &'static str,
}

/// Parent column surfaced in listings next to the stored reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Join {
    pub parent: EntityKind,
    pub local_key: &'static str,
    pub parent_key: &'static str,
    pub parent_field: &'static str,
    pub alias: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn sql(self) -> &'static str {
        match self {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        }
    }
}

#[derive(Debug)]
pub struct EntityDescriptor {
    pub kind: EntityKind,
    pub table: &'static str,
    /// Stored columns in insert order, `id` excluded
    pub fields: &'static [FieldSpec],
    pub unique: &'static [&'static str],
    pub reference: Option<Reference>,
    pub join: Option<Join>,
    /// Kind listed by `children_for` on this entity
    pub child: Option<EntityKind>,
    pub order_by: &'static [(&'static str, SortDirection)],
}

impl EntityDescriptor {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn input_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| f.is_input())
    }

    pub fn column_names(&self) -> Vec<&'static str> {
        self.fields.iter().map(|f| f.name).collect()
    }
}

pub static PURCHASE: EntityDescriptor = EntityDescriptor {
    kind: EntityKind::Purchase,
    table: "compras",
    fields: &[
        FieldSpec::required("fecha", FieldKind::Text),
        FieldSpec::required("proveedor", FieldKind::Text),
        FieldSpec::required("monto", FieldKind::Decimal),
        FieldSpec::required("identificador_producto", FieldKind::Text),
        FieldSpec::required("cliente", FieldKind::Text),
    ],
    unique: &[],
    reference: None,
    join: None,
    child: None,
    order_by: &[("id", SortDirection::Descending)],
};

// Oldest first, unlike purchases.
pub static EMPLOYEE: EntityDescriptor = EntityDescriptor {
    kind: EntityKind::Employee,
    table: "empleados",
    fields: &[
        FieldSpec::required("nombre", FieldKind::Text),
        FieldSpec::required("puesto", FieldKind::Text),
        FieldSpec::required("fecha_ingreso", FieldKind::Text),
        FieldSpec::required("sueldo", FieldKind::Decimal),
        FieldSpec::required("sucursal", FieldKind::Text),
        FieldSpec::required("contacto_mail", FieldKind::Text),
        FieldSpec::required("celular", FieldKind::Text),
        FieldSpec::optional("fecha_de_baja", FieldKind::Text),
    ],
    unique: &[],
    reference: None,
    join: None,
    child: None,
    order_by: &[("id", SortDirection::Ascending)],
};

pub static PRODUCT: EntityDescriptor = EntityDescriptor {
    kind: EntityKind::Product,
    table: "Productos",
    fields: &[
        FieldSpec::required("nombre", FieldKind::Text),
        FieldSpec::required("sku", FieldKind::Sku),
    ],
    unique: &["sku"],
    reference: None,
    join: None,
    child: None,
    order_by: &[
        ("nombre", SortDirection::Ascending),
        ("id", SortDirection::Ascending),
    ],
};

pub static LOT: EntityDescriptor = EntityDescriptor {
    kind: EntityKind::Lot,
    table: "Lotes",
    fields: &[
        FieldSpec::required("producto_sku", FieldKind::Sku),
        FieldSpec::required("cantidad", FieldKind::PositiveInteger),
        FieldSpec::created_at("fecha_creacion"),
    ],
    unique: &[],
    reference: Some(Reference {
        field: "producto_sku",
        parent: EntityKind::Product,
        parent_key: "sku",
    }),
    join: Some(Join {
        parent: EntityKind::Product,
        local_key: "producto_sku",
        parent_key: "sku",
        parent_field: "nombre",
        alias: "producto_nombre",
    }),
    child: Some(EntityKind::QualityControl),
    order_by: &[
        ("fecha_creacion", SortDirection::Descending),
        ("id", SortDirection::Descending),
    ],
};

pub static QUALITY_CONTROL: EntityDescriptor = EntityDescriptor {
    kind: EntityKind::QualityControl,
    table: "ControlesCalidad",
    fields: &[
        FieldSpec::required("lote_id", FieldKind::Integer),
        FieldSpec::required("parametro", FieldKind::Text),
        FieldSpec::required("valor", FieldKind::Decimal),
        FieldSpec::optional("aprobado", FieldKind::Flag),
        FieldSpec::created_at("timestamp"),
    ],
    unique: &[],
    reference: Some(Reference {
        field: "lote_id",
        parent: EntityKind::Lot,
        parent_key: "id",
    }),
    join: None,
    child: None,
    order_by: &[
        ("timestamp", SortDirection::Descending),
        ("id", SortDirection::Descending),
    ],
};
