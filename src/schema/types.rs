/// Inferred field data type.
///
/// Drives literal-value coercion in the compiler: `Number` and `Date`
/// compare numerically (dates as epoch milliseconds), `Checkbox` coerces
/// boolean-like literals, everything else compares as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Text,
    Date,
    Url,
    Number,
    Reference,
    Checkbox,
}

impl FieldType {
    /// Storage spelling, used for the pre-computed override column.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Date => "date",
            FieldType::Url => "url",
            FieldType::Number => "number",
            FieldType::Reference => "reference",
            FieldType::Checkbox => "checkbox",
        }
    }

    pub fn from_str(s: &str) -> Option<FieldType> {
        match s {
            "text" => Some(FieldType::Text),
            "date" => Some(FieldType::Date),
            "url" => Some(FieldType::Url),
            "number" => Some(FieldType::Number),
            "reference" => Some(FieldType::Reference),
            "checkbox" => Some(FieldType::Checkbox),
            _ => None,
        }
    }

    /// Whether ordered comparisons (`<`, `>`, ...) make sense for values
    /// of this type.
    pub fn is_orderable(&self) -> bool {
        matches!(self, FieldType::Number | FieldType::Date)
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Infer a field's data type from its normalized name.
///
/// Ordered substring/prefix rules; the first matching rule wins. Pure, so
/// the whole table is testable by enumeration.
pub fn infer_field_type(normalized: &str) -> FieldType {
    if normalized.contains("date") || normalized.contains("time") {
        FieldType::Date
    } else if normalized.contains("url") || normalized.contains("link") {
        FieldType::Url
    } else if normalized.contains("count")
        || (normalized.contains("number") && !normalized.contains("phone"))
        || normalized.contains("amount")
    {
        FieldType::Number
    } else if normalized.contains("status")
        || normalized.contains("type")
        || normalized.contains("category")
    {
        FieldType::Reference
    } else if normalized.starts_with("is")
        || normalized.starts_with("has")
        || normalized.contains("enabled")
        || normalized.contains("completed")
    {
        FieldType::Checkbox
    } else {
        FieldType::Text
    }
}

#[test]
fn test_inference_table() {
    let cases = vec![
        ("duedate", FieldType::Date),
        ("starttime", FieldType::Date),
        ("websiteurl", FieldType::Url),
        ("permalink", FieldType::Url),
        ("itemcount", FieldType::Number),
        ("serialnumber", FieldType::Number),
        ("phonenumber", FieldType::Text), // the phone exception
        ("totalamount", FieldType::Number),
        ("status", FieldType::Reference),
        ("tasktype", FieldType::Reference),
        ("category", FieldType::Reference),
        ("isarchived", FieldType::Checkbox),
        ("hasattachment", FieldType::Checkbox),
        ("notificationsenabled", FieldType::Checkbox),
        ("completed", FieldType::Checkbox),
        ("name", FieldType::Text),
        ("", FieldType::Text),
        // date wins over later rules
        ("completeddate", FieldType::Date),
    ];
    for (name, expected) in cases {
        assert_eq!(infer_field_type(name), expected, "name: {:?}", name);
    }
}
