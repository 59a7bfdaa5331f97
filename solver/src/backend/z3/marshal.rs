use std::collections::HashMap;

use delegate::delegate;

use term::Variable;

/// Links every variable of a query to the single name it is declared with in
/// the backend, and back.
#[derive(Debug, Default)]
pub(crate) struct Marshaller {
    names: HashMap<Variable, String>,
    variables: HashMap<String, Variable>,
}

impl Marshaller {
    /// The declared name of `var`, assigned on first use.
    pub fn name_of(&mut self, var: &Variable) -> &str {
        if !self.names.contains_key(var) {
            // The index keeps names unique even if two variables print alike.
            let name = format!("{var}!{}", self.names.len());
            self.variables.insert(name.clone(), var.clone());
            self.names.insert(var.clone(), name);
        }
        &self.names[var]
    }

    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.get(name)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&Variable, &str)> {
        self.names.iter().map(|(var, name)| (var, name.as_str()))
    }

    delegate! {
        to self.names {
            pub fn len(&self) -> usize;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use term::Type;

    #[test]
    fn names_are_stable_and_reversible() {
        let mut marshaller = Marshaller::default();
        let x = Variable::int("x");
        let name = marshaller.name_of(&x).to_owned();
        assert_eq!(marshaller.name_of(&x), name);
        assert_eq!(marshaller.variable(&name), Some(&x));
        assert_eq!(marshaller.len(), 1);
    }

    #[test]
    fn alike_variables_get_distinct_names() {
        let mut marshaller = Marshaller::default();
        let program = Variable::program("k", Type::Int);
        let parameter = Variable::parameter("k", Type::Int);
        let first = marshaller.name_of(&program).to_owned();
        let second = marshaller.name_of(&parameter).to_owned();
        assert_ne!(first, second);
        assert_eq!(marshaller.variable(&second), Some(&parameter));
        assert_eq!(marshaller.len(), 2);
    }
}
