//! Filter expressions

use crate::binding::{expect_ogc, required_attribute, FromElement, Tagged, ToElement};
use crate::documents::Element;
use crate::error::{DecodeError, Error, Result};
use crate::filter::evaluate::{FeatureView, Value};
use crate::namespaces::QName;
use serde::{Deserialize, Serialize};

/// `ogc:PropertyName`, a `/`-separated path into a feature
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyName {
    /// The path
    pub path: String,
}

impl PropertyName {
    /// A property reference
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    /// The value the path selects in `feature`
    pub fn evaluate<F: FeatureView + ?Sized>(&self, feature: &F) -> Result<Option<Value>> {
        feature.property(&self.path)
    }
}

impl FromElement for PropertyName {
    fn from_element(element: &Element) -> Result<Self> {
        expect_ogc(element, "PropertyName")?;
        Ok(Self::new(element.text_content().trim()))
    }
}

impl ToElement for PropertyName {
    fn to_element(&self) -> Element {
        Element::ogc("PropertyName").with_text(self.path.clone())
    }
}

/// `ogc:Literal`
///
/// Text content, or child elements such as a GML geometry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Literal {
    /// Text content
    pub value: String,
    /// Element content
    pub content: Vec<Element>,
}

impl Literal {
    /// A textual literal
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            content: Vec::new(),
        }
    }

    /// A literal holding `element`
    pub fn element(element: Element) -> Self {
        Self {
            value: String::new(),
            content: vec![element],
        }
    }

    /// The literal as a filter value
    pub fn to_value(&self) -> Result<Value> {
        Value::from_content(&self.to_element())
    }
}

impl FromElement for Literal {
    fn from_element(element: &Element) -> Result<Self> {
        expect_ogc(element, "Literal")?;
        Ok(Self {
            value: element.text_content().to_string(),
            content: element.children.clone(),
        })
    }
}

impl ToElement for Literal {
    fn to_element(&self) -> Element {
        let mut element = Element::ogc("Literal");
        if !self.value.is_empty() {
            element.set_text(self.value.clone());
        }
        element.children = self.content.clone();
        element
    }
}

/// `ogc:Function`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    /// Function name
    pub name: String,
    /// Arguments, in order
    pub arguments: Vec<Expression>,
}

impl FromElement for Function {
    fn from_element(element: &Element) -> Result<Self> {
        expect_ogc(element, "Function")?;
        Ok(Self {
            name: required_attribute(element, "name")?.to_string(),
            arguments: element
                .children
                .iter()
                .map(Expression::from_element)
                .collect::<Result<Vec<_>>>()?,
        })
    }
}

impl ToElement for Function {
    fn to_element(&self) -> Element {
        let mut element = Element::ogc("Function").with_attribute(QName::local("name"), &self.name);
        for argument in &self.arguments {
            element.add_child(argument.to_element());
        }
        element
    }
}

/// Operands of `ogc:Add`, `ogc:Sub`, `ogc:Mul` and `ogc:Div`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arithmetic {
    /// Left operand
    pub left: Expression,
    /// Right operand
    pub right: Expression,
}

impl Arithmetic {
    fn decode(element: &Element) -> Result<Box<Self>> {
        match element.children.as_slice() {
            [left, right] => Ok(Box::new(Self {
                left: Expression::from_element(left)?,
                right: Expression::from_element(right)?,
            })),
            children => Err(DecodeError::new("arithmetic needs two operands")
                .with_element(element.qname.to_string())
                .with_reason(format!("found {}", children.len()))
                .into()),
        }
    }

    fn encode(&self, name: QName) -> Element {
        Element::new(name)
            .with_child(self.left.to_element())
            .with_child(self.right.to_element())
    }
}

/// The `ogc:expression` substitution group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    /// `ogc:PropertyName`
    PropertyName(PropertyName),
    /// `ogc:Literal`
    Literal(Literal),
    /// `ogc:Function`
    Function(Function),
    /// `ogc:Add`
    Add(Box<Arithmetic>),
    /// `ogc:Sub`
    Sub(Box<Arithmetic>),
    /// `ogc:Mul`
    Mul(Box<Arithmetic>),
    /// `ogc:Div`
    Div(Box<Arithmetic>),
}

impl Expression {
    /// A property reference
    pub fn property(path: impl Into<String>) -> Self {
        Self::PropertyName(PropertyName::new(path))
    }

    /// A textual literal
    pub fn literal(value: impl Into<String>) -> Self {
        Self::Literal(Literal::new(value))
    }

    /// Evaluate against `feature`; `None` when a referenced property is absent
    pub fn evaluate<F: FeatureView + ?Sized>(&self, feature: &F) -> Result<Option<Value>> {
        let operands = match self {
            Self::PropertyName(name) => return name.evaluate(feature),
            Self::Literal(literal) => return literal.to_value().map(Some),
            Self::Function(function) => {
                return Err(Error::Unsupported(format!(
                    "evaluating function '{}'",
                    function.name
                )))
            }
            Self::Add(operands) | Self::Sub(operands) | Self::Mul(operands) | Self::Div(operands) => {
                operands
            }
        };
        let (left, right) = match (
            operands.left.evaluate(feature)?,
            operands.right.evaluate(feature)?,
        ) {
            (Some(left), Some(right)) => (left.to_number()?, right.to_number()?),
            _ => return Ok(None),
        };
        Ok(Some(Value::Number(match self {
            Self::Add(_) => left + right,
            Self::Sub(_) => left - right,
            Self::Mul(_) => left * right,
            _ => left / right,
        })))
    }
}

impl Tagged for Expression {
    fn element_name(&self) -> QName {
        QName::ogc(match self {
            Self::PropertyName(_) => "PropertyName",
            Self::Literal(_) => "Literal",
            Self::Function(_) => "Function",
            Self::Add(_) => "Add",
            Self::Sub(_) => "Sub",
            Self::Mul(_) => "Mul",
            Self::Div(_) => "Div",
        })
    }
}

impl FromElement for Expression {
    fn from_element(element: &Element) -> Result<Self> {
        if !element.qname.in_ogc() {
            return Err(Error::unsupported_variant("expression", element.qname.to_string()));
        }
        match element.local_name() {
            "PropertyName" => Ok(Self::PropertyName(PropertyName::from_element(element)?)),
            "Literal" => Ok(Self::Literal(Literal::from_element(element)?)),
            "Function" => Ok(Self::Function(Function::from_element(element)?)),
            "Add" => Ok(Self::Add(Arithmetic::decode(element)?)),
            "Sub" => Ok(Self::Sub(Arithmetic::decode(element)?)),
            "Mul" => Ok(Self::Mul(Arithmetic::decode(element)?)),
            "Div" => Ok(Self::Div(Arithmetic::decode(element)?)),
            _ => Err(Error::unsupported_variant("expression", element.qname.to_string())),
        }
    }
}

impl ToElement for Expression {
    fn to_element(&self) -> Element {
        match self {
            Self::PropertyName(name) => name.to_element(),
            Self::Literal(literal) => literal.to_element(),
            Self::Function(function) => function.to_element(),
            Self::Add(operands) | Self::Sub(operands) | Self::Mul(operands) | Self::Div(operands) => {
                operands.encode(self.element_name())
            }
        }
    }
}

impl From<PropertyName> for Expression {
    fn from(value: PropertyName) -> Self {
        Self::PropertyName(value)
    }
}

impl From<Literal> for Expression {
    fn from(value: Literal) -> Self {
        Self::Literal(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::decode_str;
    use crate::filter::evaluate::tests::MapFeature;

    #[test]
    fn test_arithmetic() {
        let xml = r#"<ogc:Add xmlns:ogc="http://www.opengis.net/ogc">
            <ogc:PropertyName>width</ogc:PropertyName>
            <ogc:Mul><ogc:Literal>2</ogc:Literal><ogc:Literal>1.5</ogc:Literal></ogc:Mul>
        </ogc:Add>"#;
        let expression: Expression = decode_str(xml).unwrap();
        let feature = MapFeature::new("f1").with("width", "4");
        assert_eq!(expression.evaluate(&feature).unwrap(), Some(Value::Number(7.0)));
        assert_eq!(expression.evaluate(&MapFeature::new("f2")).unwrap(), None);

        let back = Expression::from_element(&expression.to_element()).unwrap();
        assert_eq!(back, expression);
    }

    #[test]
    fn test_arithmetic_needs_two_operands() {
        let xml = r#"<ogc:Sub xmlns:ogc="http://www.opengis.net/ogc"><ogc:Literal>1</ogc:Literal></ogc:Sub>"#;
        assert!(matches!(decode_str::<Expression>(xml), Err(Error::Decode(_))));
    }

    #[test]
    fn test_function_not_evaluated() {
        let xml = r#"<ogc:Function xmlns:ogc="http://www.opengis.net/ogc" name="strToUpperCase">
            <ogc:PropertyName>name</ogc:PropertyName>
        </ogc:Function>"#;
        let expression: Expression = decode_str(xml).unwrap();
        assert_eq!(expression.element_name(), QName::ogc("Function"));
        assert!(matches!(
            expression.evaluate(&MapFeature::new("f1")),
            Err(Error::Unsupported(_))
        ));
    }

    #[test]
    fn test_unknown_expression() {
        let xml = r#"<ogc:Pow xmlns:ogc="http://www.opengis.net/ogc"/>"#;
        assert!(matches!(
            decode_str::<Expression>(xml),
            Err(Error::UnsupportedVariant { group: "expression", .. })
        ));
    }
}
