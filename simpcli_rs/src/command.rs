//! Command schema, annotations, and descriptor derivation.
//!
//! A command is declared as a [`CommandSpec`]: a name, a handler, an ordered
//! list of typed parameters ([`ParamSpec`]), and an ordered list of
//! [`ParamOverride`] annotations that adjust how parameters surface on the
//! command line. Registration turns the spec into a [`CommandDescriptor`]
//! with one [`ParameterDescriptor`] per declared parameter; the descriptor is
//! the source of truth for the parser backend and for dispatch, and is
//! immutable once built.

use std::fmt;

use heck::ToKebabCase;

use crate::error::SignatureError;
use crate::types::{ArgValue, CommandArgs, HandlerResult, ParamType};

/// Parameter names owned by the framework itself.
///
/// `verbose` backs the reserved global flag, `help` belongs to the parser
/// backend. Declaring either on a command fails at registration; names are
/// matched in the kebab-case form they would surface as.
const RESERVED_PARAM_NAMES: &[&str] = &["verbose", "help"];

/// Boxed command handler stored in a descriptor.
pub type Handler = Box<dyn Fn(&CommandArgs) -> HandlerResult + Send + Sync>;

// ============================================================================
// Declared schema
// ============================================================================

/// One declared command parameter: name, type, optional default.
///
/// Surface details (positional vs. flag, help text) are not part of the
/// schema; they come from [`ParamOverride`] annotations or from the default
/// rules applied during derivation.
#[derive(Debug, Clone)]
pub struct ParamSpec {
    name: String,
    kind: ParamType,
    default: Option<ArgValue>,
}

impl ParamSpec {
    /// Declare a parameter with no type: it binds as a string.
    pub fn new(name: impl Into<String>) -> Self {
        Self::typed(name, ParamType::Str)
    }

    /// Declare a string parameter.
    pub fn string(name: impl Into<String>) -> Self {
        Self::typed(name, ParamType::Str)
    }

    /// Declare an integer parameter.
    pub fn integer(name: impl Into<String>) -> Self {
        Self::typed(name, ParamType::Int)
    }

    /// Declare a float parameter.
    pub fn float(name: impl Into<String>) -> Self {
        Self::typed(name, ParamType::Float)
    }

    /// Declare a boolean parameter.
    pub fn boolean(name: impl Into<String>) -> Self {
        Self::typed(name, ParamType::Bool)
    }

    fn typed(name: impl Into<String>, kind: ParamType) -> Self {
        Self {
            name: name.into(),
            kind,
            default: None,
        }
    }

    /// Give the parameter a default. A defaulted parameter surfaces as a
    /// flag unless an annotation forces it back to positional.
    pub fn default_value(mut self, value: impl Into<ArgValue>) -> Self {
        self.default = Some(value.into());
        self
    }
}

/// An annotation adjusting one parameter's command-line surface.
///
/// Annotations are applied in the order they are declared. An anonymous
/// annotation binds to the next parameter (in declaration order) that no
/// earlier annotation has claimed; a named one binds to its target directly.
#[derive(Debug, Clone, Default)]
pub struct ParamOverride {
    target: Option<String>,
    positional: Option<bool>,
    help: Option<String>,
}

impl ParamOverride {
    /// An annotation matched to a parameter by declaration order.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// An annotation bound to the named parameter.
    pub fn named(target: impl Into<String>) -> Self {
        Self {
            target: Some(target.into()),
            ..Self::default()
        }
    }

    /// Force the parameter to bind by position, even if it has a default.
    pub fn positional(mut self) -> Self {
        self.positional = Some(true);
        self
    }

    /// Force the parameter to bind as a `--flag`.
    pub fn flag(mut self) -> Self {
        self.positional = Some(false);
        self
    }

    /// Help text shown for the parameter.
    pub fn help(mut self, text: impl Into<String>) -> Self {
        self.help = Some(text.into());
        self
    }
}

/// A command declaration: handler plus schema, ready for registration.
pub struct CommandSpec {
    name: String,
    summary: Option<String>,
    params: Vec<ParamSpec>,
    overrides: Vec<ParamOverride>,
    handler: Handler,
}

impl CommandSpec {
    /// Declare a command backed by `handler`.
    ///
    /// The name is normalized to kebab-case at registration, so a handler
    /// named `no_args` becomes the `no-args` command.
    pub fn new<F>(name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&CommandArgs) -> HandlerResult + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            summary: None,
            params: Vec::new(),
            overrides: Vec::new(),
            handler: Box::new(handler),
        }
    }

    /// One-line description used as the command's help text.
    pub fn summary(mut self, text: impl Into<String>) -> Self {
        self.summary = Some(text.into());
        self
    }

    /// Append a parameter to the schema. Declaration order is binding order
    /// for positionals.
    pub fn param(mut self, spec: ParamSpec) -> Self {
        self.params.push(spec);
        self
    }

    /// Append an annotation. See [`ParamOverride`] for matching rules.
    pub fn annotate(mut self, annotation: ParamOverride) -> Self {
        self.overrides.push(annotation);
        self
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    /// Derive the descriptor, consuming the spec. The parameter sequence is
    /// computed exactly once here and never mutated afterwards.
    pub(crate) fn into_descriptor(self, name: String) -> Result<CommandDescriptor, SignatureError> {
        let parameters = derive_parameters(&self.params, &self.overrides)?;
        Ok(CommandDescriptor {
            name,
            summary: self.summary,
            parameters,
            handler: self.handler,
        })
    }
}

impl fmt::Debug for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandSpec")
            .field("name", &self.name)
            .field("summary", &self.summary)
            .field("params", &self.params)
            .field("overrides", &self.overrides)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Derived descriptors
// ============================================================================

/// Final metadata for one parameter, derived from schema plus annotations.
#[derive(Debug, Clone)]
pub struct ParameterDescriptor {
    /// Declared parameter name; handlers look values up under it.
    pub name: String,

    /// Declared type, used for coercion by the parser backend.
    pub kind: ParamType,

    /// Binds by position when true, as a `--flag` otherwise.
    pub positional: bool,

    /// Declared default. A parameter is required exactly when this is `None`.
    pub default: Option<ArgValue>,

    /// Help text from the parameter's annotation, if any.
    pub help: Option<String>,
}

/// A registered command: derived name, parameter sequence, and the handler.
pub struct CommandDescriptor {
    /// Registry key, kebab-cased.
    pub name: String,

    /// One-line help text.
    pub summary: Option<String>,

    /// Derived parameter sequence, in declaration order.
    pub parameters: Vec<ParameterDescriptor>,

    handler: Handler,
}

impl CommandDescriptor {
    /// Invoke the underlying handler with bound arguments.
    pub fn invoke(&self, args: &CommandArgs) -> HandlerResult {
        (self.handler)(args)
    }
}

impl fmt::Debug for CommandDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDescriptor")
            .field("name", &self.name)
            .field("summary", &self.summary)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Derivation
// ============================================================================

/// Turn the declared schema and its annotations into the final parameter
/// sequence.
///
/// Rules, in order:
/// - parameter names must be unique and not reserved, and a declared default
///   must match the declared type;
/// - named annotations claim their target, anonymous ones claim the next
///   unclaimed parameter in declaration order, one annotation per parameter;
/// - a parameter is positional when it has no default, unless its annotation
///   says otherwise;
/// - a required positional may not follow an optional one.
fn derive_parameters(
    params: &[ParamSpec],
    overrides: &[ParamOverride],
) -> Result<Vec<ParameterDescriptor>, SignatureError> {
    for (i, param) in params.iter().enumerate() {
        if RESERVED_PARAM_NAMES.contains(&param.name.to_kebab_case().as_str()) {
            return Err(SignatureError::ReservedName(param.name.clone()));
        }
        if params[..i].iter().any(|earlier| earlier.name == param.name) {
            return Err(SignatureError::DuplicateParameter(param.name.clone()));
        }
        if let Some(default) = &param.default {
            if default.kind() != param.kind {
                return Err(SignatureError::DefaultTypeMismatch {
                    name: param.name.clone(),
                    declared: param.kind.label(),
                    actual: default.kind().label(),
                });
            }
        }
    }

    let mut claimed: Vec<Option<&ParamOverride>> = vec![None; params.len()];
    for (index, annotation) in overrides.iter().enumerate() {
        let slot = match &annotation.target {
            Some(target) => params
                .iter()
                .position(|param| &param.name == target)
                .ok_or_else(|| SignatureError::UnknownParameter(target.clone()))?,
            None => claimed
                .iter()
                .position(Option::is_none)
                .ok_or(SignatureError::ExcessAnnotation(index + 1))?,
        };
        if claimed[slot].is_some() {
            return Err(SignatureError::DuplicateAnnotation(
                params[slot].name.clone(),
            ));
        }
        claimed[slot] = Some(annotation);
    }

    let mut descriptors = Vec::with_capacity(params.len());
    let mut saw_optional_positional = false;
    for (param, annotation) in params.iter().zip(&claimed) {
        let positional = annotation
            .and_then(|a| a.positional)
            .unwrap_or_else(|| param.default.is_none());
        if positional {
            if param.default.is_none() && saw_optional_positional {
                return Err(SignatureError::RequiredAfterOptional(param.name.clone()));
            }
            if param.default.is_some() {
                saw_optional_positional = true;
            }
        }
        descriptors.push(ParameterDescriptor {
            name: param.name.clone(),
            kind: param.kind,
            positional,
            default: param.default.clone(),
            help: annotation.and_then(|a| a.help.clone()),
        });
    }

    Ok(descriptors)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Outcome;

    fn noop() -> impl Fn(&CommandArgs) -> HandlerResult + Send + Sync + 'static {
        |_| Ok(Outcome::Code(0))
    }

    fn derive(spec: CommandSpec) -> Result<Vec<ParameterDescriptor>, SignatureError> {
        derive_parameters(&spec.params, &spec.overrides)
    }

    #[test]
    fn test_one_descriptor_per_parameter_in_declared_order() {
        let spec = CommandSpec::new("positional_args", noop())
            .param(ParamSpec::string("one"))
            .param(ParamSpec::integer("two"))
            .param(ParamSpec::float("three"));

        let descriptors = derive(spec).unwrap();
        assert_eq!(descriptors.len(), 3);
        assert_eq!(descriptors[0].name, "one");
        assert_eq!(descriptors[1].name, "two");
        assert_eq!(descriptors[2].name, "three");
        assert!(descriptors.iter().all(|d| d.positional));
    }

    #[test]
    fn test_untyped_parameter_binds_as_string() {
        let spec = CommandSpec::new("cmd", noop()).param(ParamSpec::new("value"));
        let descriptors = derive(spec).unwrap();
        assert_eq!(descriptors[0].kind, ParamType::Str);
    }

    #[test]
    fn test_default_turns_parameter_into_flag() {
        let spec = CommandSpec::new("cmd", noop())
            .param(ParamSpec::string("target"))
            .param(ParamSpec::integer("level").default_value(3));

        let descriptors = derive(spec).unwrap();
        assert!(descriptors[0].positional);
        assert!(!descriptors[1].positional);
        assert_eq!(descriptors[1].default, Some(ArgValue::Int(3)));
    }

    #[test]
    fn test_annotation_overrides_flag_rule() {
        let spec = CommandSpec::new("cmd", noop())
            .param(ParamSpec::integer("level").default_value(3))
            .annotate(ParamOverride::named("level").positional());

        let descriptors = derive(spec).unwrap();
        assert!(descriptors[0].positional);
    }

    #[test]
    fn test_anonymous_annotations_match_in_declaration_order() {
        // Mirrors a named annotation on the first parameter followed by an
        // anonymous one: the anonymous annotation lands on the second.
        let spec = CommandSpec::new("positional_args", noop())
            .param(ParamSpec::string("one"))
            .param(ParamSpec::integer("two"))
            .annotate(ParamOverride::named("one").help("first"))
            .annotate(ParamOverride::anonymous().help("second"));

        let descriptors = derive(spec).unwrap();
        assert_eq!(descriptors[0].help.as_deref(), Some("first"));
        assert_eq!(descriptors[1].help.as_deref(), Some("second"));
    }

    #[test]
    fn test_unknown_annotation_target_fails() {
        let spec = CommandSpec::new("cmd", noop())
            .param(ParamSpec::string("one"))
            .annotate(ParamOverride::named("missing"));

        assert_eq!(
            derive(spec).unwrap_err(),
            SignatureError::UnknownParameter("missing".into())
        );
    }

    #[test]
    fn test_excess_anonymous_annotation_fails() {
        let spec = CommandSpec::new("cmd", noop())
            .param(ParamSpec::string("one"))
            .annotate(ParamOverride::anonymous())
            .annotate(ParamOverride::anonymous());

        assert_eq!(derive(spec).unwrap_err(), SignatureError::ExcessAnnotation(2));
    }

    #[test]
    fn test_double_annotation_on_one_parameter_fails() {
        let spec = CommandSpec::new("cmd", noop())
            .param(ParamSpec::string("one"))
            .annotate(ParamOverride::anonymous())
            .annotate(ParamOverride::named("one"));

        assert_eq!(
            derive(spec).unwrap_err(),
            SignatureError::DuplicateAnnotation("one".into())
        );
    }

    #[test]
    fn test_duplicate_parameter_name_fails() {
        let spec = CommandSpec::new("cmd", noop())
            .param(ParamSpec::string("one"))
            .param(ParamSpec::integer("one"));

        assert_eq!(
            derive(spec).unwrap_err(),
            SignatureError::DuplicateParameter("one".into())
        );
    }

    #[test]
    fn test_reserved_parameter_name_fails() {
        let spec = CommandSpec::new("cmd", noop()).param(ParamSpec::boolean("verbose"));
        assert_eq!(
            derive(spec).unwrap_err(),
            SignatureError::ReservedName("verbose".into())
        );
    }

    #[test]
    fn test_reserved_names_are_matched_on_their_surface_form() {
        // `Verbose` would surface as `--verbose` and collide with the
        // reserved flag.
        let spec = CommandSpec::new("cmd", noop())
            .param(ParamSpec::boolean("Verbose").default_value(false));
        assert_eq!(
            derive(spec).unwrap_err(),
            SignatureError::ReservedName("Verbose".into())
        );

        let spec = CommandSpec::new("cmd", noop()).param(ParamSpec::string("HELP"));
        assert_eq!(
            derive(spec).unwrap_err(),
            SignatureError::ReservedName("HELP".into())
        );
    }

    #[test]
    fn test_required_positional_after_optional_fails() {
        let spec = CommandSpec::new("cmd", noop())
            .param(ParamSpec::string("first").default_value("x"))
            .param(ParamSpec::string("second"))
            .annotate(ParamOverride::named("first").positional());

        assert_eq!(
            derive(spec).unwrap_err(),
            SignatureError::RequiredAfterOptional("second".into())
        );
    }

    #[test]
    fn test_default_type_mismatch_fails() {
        let spec = CommandSpec::new("cmd", noop())
            .param(ParamSpec::integer("level").default_value("three"));

        assert!(matches!(
            derive(spec).unwrap_err(),
            SignatureError::DefaultTypeMismatch { .. }
        ));
    }

    #[test]
    fn test_descriptor_invoke_calls_handler() {
        let descriptor = CommandSpec::new("cmd", |_| Ok(Outcome::Code(7)))
            .into_descriptor("cmd".into())
            .unwrap();
        assert_eq!(
            descriptor.invoke(&CommandArgs::default()).unwrap(),
            Outcome::Code(7)
        );
    }
}
