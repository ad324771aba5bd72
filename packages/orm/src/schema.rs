//! Model descriptions and the schemas parsed from them.

use sea_orm::Value;

use crate::naming::NamingStrategy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Boolean,
    SmallInteger,
    Integer,
    BigInteger,
    Float,
    Double,
    Text,
    /// Variable-length string, with an optional length limit.
    String(Option<u32>),
    Timestamp,
    TimestampTz,
    Date,
    Binary,
    Json,
    Uuid,
}

/// Only public fields become columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyRef {
    pub table: String,
    pub column: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub name: String,
    pub column: Option<String>,
    pub kind: ColumnKind,
    pub visibility: Visibility,
    pub primary_key: bool,
    pub auto_increment: bool,
    pub nullable: bool,
    pub unique: bool,
    pub default: Option<Value>,
    pub references: Option<ForeignKeyRef>,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            name: name.into(),
            column: None,
            kind,
            visibility: Visibility::Public,
            primary_key: false,
            auto_increment: false,
            nullable: false,
            unique: false,
            default: None,
            references: None,
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn private(mut self) -> Self {
        self.visibility = Visibility::Private;
        self
    }

    /// Use `name` as the column instead of the naming strategy's choice.
    pub fn column(mut self, name: impl Into<String>) -> Self {
        self.column = Some(name.into());
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn references(mut self, table: impl Into<String>, column: impl Into<String>) -> Self {
        self.references = Some(ForeignKeyRef {
            table: table.into(),
            column: column.into(),
        });
        self
    }

    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }
}

/// Static description of a model type: its name, fields and optional table
/// override. Available without a live connection.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelDescriptor {
    pub type_name: String,
    pub table: Option<String>,
    pub fields: Vec<FieldDescriptor>,
}

impl ModelDescriptor {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            table: None,
            fields: Vec::new(),
        }
    }

    pub fn table(mut self, name: impl Into<String>) -> Self {
        self.table = Some(name.into());
        self
    }

    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    pub fn public_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| f.is_public())
    }
}

pub trait Model {
    fn descriptor() -> ModelDescriptor;
}

/// A model instance that can be written.
pub trait Record: Model {
    /// One value per public field, in declaration order.
    fn values(&self) -> Vec<Value>;
}

/// A public field resolved to its column.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub db_name: String,
    pub kind: ColumnKind,
    pub primary_key: bool,
    pub auto_increment: bool,
    pub nullable: bool,
    pub unique: bool,
    pub default: Option<Value>,
    pub references: Option<ForeignKeyRef>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub name: String,
    pub table: String,
    pub fields: Vec<Field>,
}

impl Schema {
    pub fn parse(descriptor: &ModelDescriptor, naming: &dyn NamingStrategy) -> Self {
        let table = descriptor
            .table
            .clone()
            .unwrap_or_else(|| naming.table_name(&descriptor.type_name));

        let fields = descriptor
            .public_fields()
            .map(|f| Field {
                name: f.name.clone(),
                db_name: f
                    .column
                    .clone()
                    .unwrap_or_else(|| naming.column_name(&table, &f.name)),
                kind: f.kind,
                primary_key: f.primary_key,
                auto_increment: f.auto_increment,
                nullable: f.nullable,
                unique: f.unique,
                default: f.default.clone(),
                references: f.references.clone(),
            })
            .collect();

        Self {
            name: descriptor.type_name.clone(),
            table,
            fields,
        }
    }

    pub fn column_names(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.db_name.clone()).collect()
    }

    pub fn field(&self, db_name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.db_name == db_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naming::DefaultNamingStrategy;

    fn descriptor() -> ModelDescriptor {
        ModelDescriptor::new("UserAccount")
            .field(FieldDescriptor::new("ID", ColumnKind::Integer).primary_key().auto_increment())
            .field(FieldDescriptor::new("DisplayName", ColumnKind::String(Some(64))))
            .field(FieldDescriptor::new("passwordHash", ColumnKind::Text).private())
            .field(FieldDescriptor::new("Email", ColumnKind::Text).column("email_address").unique())
    }

    #[test]
    fn parse_keeps_public_fields_in_order() {
        let schema = Schema::parse(&descriptor(), &DefaultNamingStrategy::default());
        assert_eq!(schema.name, "UserAccount");
        assert_eq!(schema.table, "user_accounts");
        assert_eq!(schema.column_names(), vec!["id", "display_name", "email_address"]);
        assert!(schema.field("password_hash").is_none());
        assert!(schema.field("id").is_some_and(|f| f.primary_key && f.auto_increment));
        assert!(schema.field("email_address").is_some_and(|f| f.unique));
    }

    #[test]
    fn table_override_wins_over_naming() {
        let d = descriptor().table("accounts");
        let schema = Schema::parse(&d, &DefaultNamingStrategy::default());
        assert_eq!(schema.table, "accounts");
    }

    #[test]
    fn field_builder_flags() {
        let f = FieldDescriptor::new("OwnerID", ColumnKind::Integer)
            .nullable()
            .default_value(0)
            .references("users", "id");
        assert!(f.nullable);
        assert_eq!(f.default, Some(Value::Int(Some(0))));
        assert_eq!(
            f.references,
            Some(ForeignKeyRef {
                table: "users".into(),
                column: "id".into()
            })
        );
    }
}
