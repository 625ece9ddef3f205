use super::*;
use apl_value::ErrorCode;
use pretty_assertions::assert_eq;

const CT: f64 = 1e-13;

#[test]
fn symbols_round_trip() {
    for f in ScalarFn::ALL {
        assert_eq!(ScalarFn::from_symbol(f.symbol()), Some(f));
    }
    assert_eq!(ScalarFn::from_symbol("⍴"), None);
}

#[test]
fn every_function_has_some_form() {
    for f in ScalarFn::ALL {
        assert!(f.monadic().is_some() || f.dyadic().is_some(), "{f} has no form");
    }
}

#[test]
fn dyadic_form_takes_right_operand_first() {
    let minus = ScalarFn::Minus.dyadic();
    assert!(minus.is_some());
    if let Some(minus) = minus {
        // 10 - 3
        assert_eq!(minus(&Cell::Int(3), &Cell::Int(10), CT), Ok(Cell::Int(7)));
    }
}

#[test]
fn valence_only_functions() {
    assert!(ScalarFn::Tilde.dyadic().is_none());
    assert!(ScalarFn::BitNot.dyadic().is_none());
    assert!(ScalarFn::And.monadic().is_none());
    assert!(ScalarFn::Less.monadic().is_none());
}

#[test]
fn identity_elements_are_identities() {
    let b = Cell::Int(7);
    for f in ScalarFn::ALL {
        let (Some(id), Some(dyadic)) = (f.identity(), f.dyadic()) else {
            continue;
        };
        // Boolean-only functions are checked on a boolean right operand.
        let b = match f {
            ScalarFn::And
            | ScalarFn::Or
            | ScalarFn::Equal
            | ScalarFn::NotEqual
            | ScalarFn::Less => Cell::Int(1),
            ScalarFn::LessEq | ScalarFn::GreaterEq | ScalarFn::Greater => continue,
            // Right identities: B ÷ 1, B * 1, B - 0.
            ScalarFn::Minus | ScalarFn::Divide | ScalarFn::Star | ScalarFn::Quote => continue,
            _ => b.clone(),
        };
        let z = dyadic(&b, &id, CT);
        assert_eq!(z, Ok(b), "{f}");
    }
}

#[test]
fn functions_without_identity() {
    assert_eq!(ScalarFn::Circle.identity(), None);
    assert_eq!(ScalarFn::Log.identity(), None);
    assert_eq!(ScalarFn::Nand.identity(), None);
}

#[test]
fn strict_comparisons_have_identity_zero() {
    assert_eq!(ScalarFn::Less.identity(), Some(Cell::Int(0)));
    assert_eq!(ScalarFn::Greater.identity(), Some(Cell::Int(0)));
    let greater = ScalarFn::Greater.dyadic();
    assert!(greater.is_some());
    if let Some(greater) = greater {
        // A > 0 is A for booleans.
        assert_eq!(greater(&Cell::Int(0), &Cell::Int(1), CT), Ok(Cell::Int(1)));
        assert_eq!(greater(&Cell::Int(0), &Cell::Int(0), CT), Ok(Cell::Int(0)));
    }
}

#[test]
fn primitives_propagate_domain_errors() {
    let divide = ScalarFn::Divide.dyadic();
    assert!(divide.is_some());
    if let Some(divide) = divide {
        assert_eq!(divide(&Cell::Int(0), &Cell::Int(1), CT), Err(ErrorCode::Domain));
    }
}
