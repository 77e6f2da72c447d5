//! XSD built-in types
//!
//! The registry of primitive and derived types that a schema can reference
//! without declaring them. Lookups accept prefixed names (`xs:string`) and
//! compare by local name.

use std::fmt;

use crate::names::local_name;

/// XSD 1.0 Namespace
pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

/// A built-in XSD type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinType {
    // String types
    /// xs:string
    String,
    /// xs:normalizedString
    NormalizedString,
    /// xs:token
    Token,
    /// xs:language
    Language,
    /// xs:Name
    Name,
    /// xs:NCName
    NCName,
    /// xs:ID
    Id,
    /// xs:IDREF
    IdRef,
    /// xs:IDREFS
    IdRefs,
    /// xs:ENTITY
    Entity,
    /// xs:ENTITIES
    Entities,
    /// xs:NMTOKEN
    NmToken,
    /// xs:NMTOKENS
    NmTokens,

    /// xs:boolean
    Boolean,

    // Numeric types
    /// xs:decimal
    Decimal,
    /// xs:integer
    Integer,
    /// xs:long
    Long,
    /// xs:int
    Int,
    /// xs:short
    Short,
    /// xs:byte
    Byte,
    /// xs:nonNegativeInteger
    NonNegativeInteger,
    /// xs:positiveInteger
    PositiveInteger,
    /// xs:unsignedLong
    UnsignedLong,
    /// xs:unsignedInt
    UnsignedInt,
    /// xs:unsignedShort
    UnsignedShort,
    /// xs:unsignedByte
    UnsignedByte,
    /// xs:nonPositiveInteger
    NonPositiveInteger,
    /// xs:negativeInteger
    NegativeInteger,
    /// xs:float
    Float,
    /// xs:double
    Double,

    // Date/time types
    /// xs:duration
    Duration,
    /// xs:dateTime
    DateTime,
    /// xs:time
    Time,
    /// xs:date
    Date,
    /// xs:gYearMonth
    GYearMonth,
    /// xs:gYear
    GYear,
    /// xs:gMonthDay
    GMonthDay,
    /// xs:gDay
    GDay,
    /// xs:gMonth
    GMonth,

    // Binary types
    /// xs:hexBinary
    HexBinary,
    /// xs:base64Binary
    Base64Binary,

    // Other types
    /// xs:anyURI
    AnyUri,
    /// xs:QName
    QName,
    /// xs:NOTATION
    Notation,

    // Special types
    /// xs:anyType
    AnyType,
    /// xs:anySimpleType
    AnySimpleType,
}

impl BuiltinType {
    /// Look up a built-in type by (possibly prefixed) name
    pub fn from_name(name: &str) -> Option<Self> {
        use BuiltinType::*;
        let builtin = match local_name(name) {
            "string" => String,
            "normalizedString" => NormalizedString,
            "token" => Token,
            "language" => Language,
            "Name" => Name,
            "NCName" => NCName,
            "ID" => Id,
            "IDREF" => IdRef,
            "IDREFS" => IdRefs,
            "ENTITY" => Entity,
            "ENTITIES" => Entities,
            "NMTOKEN" => NmToken,
            "NMTOKENS" => NmTokens,
            "boolean" => Boolean,
            "decimal" => Decimal,
            "integer" => Integer,
            "long" => Long,
            "int" => Int,
            "short" => Short,
            "byte" => Byte,
            "nonNegativeInteger" => NonNegativeInteger,
            "positiveInteger" => PositiveInteger,
            "unsignedLong" => UnsignedLong,
            "unsignedInt" => UnsignedInt,
            "unsignedShort" => UnsignedShort,
            "unsignedByte" => UnsignedByte,
            "nonPositiveInteger" => NonPositiveInteger,
            "negativeInteger" => NegativeInteger,
            "float" => Float,
            "double" => Double,
            "duration" => Duration,
            "dateTime" => DateTime,
            "time" => Time,
            "date" => Date,
            "gYearMonth" => GYearMonth,
            "gYear" => GYear,
            "gMonthDay" => GMonthDay,
            "gDay" => GDay,
            "gMonth" => GMonth,
            "hexBinary" => HexBinary,
            "base64Binary" => Base64Binary,
            "anyURI" => AnyUri,
            "QName" => QName,
            "NOTATION" => Notation,
            "anyType" => AnyType,
            "anySimpleType" => AnySimpleType,
            _ => return None,
        };
        Some(builtin)
    }

    /// XSD local name of the type
    pub fn name(&self) -> &'static str {
        use BuiltinType::*;
        match self {
            String => "string",
            NormalizedString => "normalizedString",
            Token => "token",
            Language => "language",
            Name => "Name",
            NCName => "NCName",
            Id => "ID",
            IdRef => "IDREF",
            IdRefs => "IDREFS",
            Entity => "ENTITY",
            Entities => "ENTITIES",
            NmToken => "NMTOKEN",
            NmTokens => "NMTOKENS",
            Boolean => "boolean",
            Decimal => "decimal",
            Integer => "integer",
            Long => "long",
            Int => "int",
            Short => "short",
            Byte => "byte",
            NonNegativeInteger => "nonNegativeInteger",
            PositiveInteger => "positiveInteger",
            UnsignedLong => "unsignedLong",
            UnsignedInt => "unsignedInt",
            UnsignedShort => "unsignedShort",
            UnsignedByte => "unsignedByte",
            NonPositiveInteger => "nonPositiveInteger",
            NegativeInteger => "negativeInteger",
            Float => "float",
            Double => "double",
            Duration => "duration",
            DateTime => "dateTime",
            Time => "time",
            Date => "date",
            GYearMonth => "gYearMonth",
            GYear => "gYear",
            GMonthDay => "gMonthDay",
            GDay => "gDay",
            GMonth => "gMonth",
            HexBinary => "hexBinary",
            Base64Binary => "base64Binary",
            AnyUri => "anyURI",
            QName => "QName",
            Notation => "NOTATION",
            AnyType => "anyType",
            AnySimpleType => "anySimpleType",
        }
    }

    /// Rust type used for fields of this type in generated code
    pub fn rust_type(&self) -> &'static str {
        use BuiltinType::*;
        match self {
            Boolean => "bool",
            Decimal => "rust_decimal::Decimal",
            Integer | Long | NonPositiveInteger | NegativeInteger => "i64",
            Int => "i32",
            Short => "i16",
            Byte => "i8",
            NonNegativeInteger | PositiveInteger | UnsignedLong => "u64",
            UnsignedInt => "u32",
            UnsignedShort => "u16",
            UnsignedByte => "u8",
            Float => "f32",
            Double => "f64",
            IdRefs | Entities | NmTokens => "Vec<String>",
            HexBinary | Base64Binary => "Vec<u8>",
            _ => "String",
        }
    }
}

impl fmt::Display for BuiltinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Check if a name refers to a built-in type
pub fn is_builtin(name: &str) -> bool {
    BuiltinType::from_name(name).is_some()
}

/// Resolve a name to a built-in type marker
pub fn resolve_builtin(name: &str) -> Option<BuiltinType> {
    BuiltinType::from_name(name)
}
