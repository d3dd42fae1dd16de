use compile_assert_core::{Location, StandardLocation};

use super::Representation;

/// Renders a location by its name, e.g. `CLASS_OUTPUT` or `MODULE_PATH[foo]`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocationRepresentation;

impl Representation<Location> for LocationRepresentation {
    fn to_string_of(&self, value: &Location) -> String {
        value.name()
    }
}

impl Representation<StandardLocation> for LocationRepresentation {
    fn to_string_of(&self, value: &StandardLocation) -> String {
        value.name().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_location_names() {
        let repr = LocationRepresentation;
        assert_eq!(repr.to_string_of(&StandardLocation::ClassOutput), "CLASS_OUTPUT");
        assert_eq!(
            repr.to_string_of(&Location::module(StandardLocation::ModulePath, "org.example")),
            "MODULE_PATH[org.example]"
        );
    }
}
