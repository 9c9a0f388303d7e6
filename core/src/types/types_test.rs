use super::*;

#[test]
fn test_str_is_char_array() {
    assert_eq!(Type::STR, Type::array(Primitive::Char, 1));
    assert!(Type::STR.is_str());
    assert!(!Type::array(Primitive::Char, 2).is_str());
    assert!(!Type::CHAR.is_str());
}

#[test]
fn test_equality_requires_dimension() {
    assert_ne!(Type::INT, Type::array(Primitive::Int, 1));
    assert_eq!(Type::array(Primitive::Int, 2), Type::INT.nested(2));
}

#[test]
fn test_element_type() {
    assert_eq!(Type::INT.nested(2).element(), Some(Type::INT.nested(1)));
    assert_eq!(Type::STR.element(), Some(Type::CHAR));
    assert_eq!(Type::FLOAT.element(), None);
}

#[test]
fn test_promote() {
    assert_eq!(Type::promote(Type::INT, Type::FLOAT), Some(Type::FLOAT));
    assert_eq!(Type::promote(Type::CHAR, Type::INT), Some(Type::INT));
    assert_eq!(Type::promote(Type::CHAR, Type::CHAR), Some(Type::CHAR));
    assert_eq!(Type::promote(Type::BOOL, Type::INT), None);
    assert_eq!(Type::promote(Type::STR, Type::INT), None);
}

#[test]
fn test_display() {
    assert_eq!(Type::BOOL.to_string(), "bool");
    assert_eq!(Type::STR.to_string(), "str");
    assert_eq!(Type::STR.nested(1).to_string(), "str[]");
    assert_eq!(Type::FLOAT.nested(2).to_string(), "float[][]");
}
