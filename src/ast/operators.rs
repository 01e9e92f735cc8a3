/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    // Negation
    /// Arithmetic negation (`negate`)
    Negate,
    /// Logical negation (`not`)
    Not,

    // Type predicates
    /// `isLogical`
    IsLogical,
    /// `isNumber`
    IsNumber,
    /// `isText`
    IsText,
    /// `isDatetime`
    IsDatetime,
    /// `isMissing`
    IsMissing,

    // Conversions
    /// `toLogical`
    ToLogical,
    /// `toNumber`
    ToNumber,
    /// `toText`
    ToText,
    /// `toDatetime`
    ToDatetime,

    // Datetime extraction
    /// `toYear`
    ToYear,
    /// `toMonth` (1-based)
    ToMonth,
    /// `toDay` (day of month, 1-based)
    ToDay,
    /// `toWeekday` (0 = Sunday)
    ToWeekday,
    /// `toHours`
    ToHours,
    /// `toMinutes`
    ToMinutes,
    /// `toSeconds`
    ToSeconds,
}

impl UnaryOp {
    pub const ALL: [UnaryOp; 18] = [
        UnaryOp::Negate,
        UnaryOp::Not,
        UnaryOp::IsLogical,
        UnaryOp::IsNumber,
        UnaryOp::IsText,
        UnaryOp::IsDatetime,
        UnaryOp::IsMissing,
        UnaryOp::ToLogical,
        UnaryOp::ToNumber,
        UnaryOp::ToText,
        UnaryOp::ToDatetime,
        UnaryOp::ToYear,
        UnaryOp::ToMonth,
        UnaryOp::ToDay,
        UnaryOp::ToWeekday,
        UnaryOp::ToHours,
        UnaryOp::ToMinutes,
        UnaryOp::ToSeconds,
    ];

    /// The species name used in JSON.
    pub fn species(self) -> &'static str {
        match self {
            UnaryOp::Negate => "negate",
            UnaryOp::Not => "not",
            UnaryOp::IsLogical => "isLogical",
            UnaryOp::IsNumber => "isNumber",
            UnaryOp::IsText => "isText",
            UnaryOp::IsDatetime => "isDatetime",
            UnaryOp::IsMissing => "isMissing",
            UnaryOp::ToLogical => "toLogical",
            UnaryOp::ToNumber => "toNumber",
            UnaryOp::ToText => "toText",
            UnaryOp::ToDatetime => "toDatetime",
            UnaryOp::ToYear => "toYear",
            UnaryOp::ToMonth => "toMonth",
            UnaryOp::ToDay => "toDay",
            UnaryOp::ToWeekday => "toWeekday",
            UnaryOp::ToHours => "toHours",
            UnaryOp::ToMinutes => "toMinutes",
            UnaryOp::ToSeconds => "toSeconds",
        }
    }

    /// Look up a species name. Older editors say `String` where we say `Text`.
    pub fn from_species(name: &str) -> Option<Self> {
        match name {
            "isString" => Some(UnaryOp::IsText),
            "toString" => Some(UnaryOp::ToText),
            _ => Self::ALL.into_iter().find(|op| op.species() == name),
        }
    }
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    // Arithmetic
    /// `add`
    Add,
    /// `subtract`
    Subtract,
    /// `multiply`
    Multiply,
    /// `divide`
    Divide,
    /// `power`
    Power,
    /// `remainder`
    Remainder,

    // Comparison
    /// `equal`
    Equal,
    /// `notEqual`
    NotEqual,
    /// `greater`
    Greater,
    /// `greaterEqual`
    GreaterEqual,
    /// `less`
    Less,
    /// `lessEqual`
    LessEqual,

    // Logical (short-circuiting)
    /// `and`
    And,
    /// `or`
    Or,
}

impl BinOp {
    pub const ALL: [BinOp; 14] = [
        BinOp::Add,
        BinOp::Subtract,
        BinOp::Multiply,
        BinOp::Divide,
        BinOp::Power,
        BinOp::Remainder,
        BinOp::Equal,
        BinOp::NotEqual,
        BinOp::Greater,
        BinOp::GreaterEqual,
        BinOp::Less,
        BinOp::LessEqual,
        BinOp::And,
        BinOp::Or,
    ];

    /// The species name used in JSON.
    pub fn species(self) -> &'static str {
        match self {
            BinOp::Add => "add",
            BinOp::Subtract => "subtract",
            BinOp::Multiply => "multiply",
            BinOp::Divide => "divide",
            BinOp::Power => "power",
            BinOp::Remainder => "remainder",
            BinOp::Equal => "equal",
            BinOp::NotEqual => "notEqual",
            BinOp::Greater => "greater",
            BinOp::GreaterEqual => "greaterEqual",
            BinOp::Less => "less",
            BinOp::LessEqual => "lessEqual",
            BinOp::And => "and",
            BinOp::Or => "or",
        }
    }

    pub fn from_species(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.species() == name)
    }
}

/// Species name of the only ternary operator.
pub const IF_ELSE: &str = "ifElse";
