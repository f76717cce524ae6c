//! Table of `output <- inputs` bindings.
//!
//! Bindings are registered once at startup and never mutated afterwards. A
//! dispatch looks up one binding, checks its inputs and runs its handler
//! against the shared dataset; handlers share no state with each other.

use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::chart::ChartSpec;
use crate::dataset::Dataset;
use crate::error::BindingError;
use crate::records::Outcome;

/// What triggers a binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum InputSource {
    /// A control whose current value is passed to the handler.
    Control(String),
    /// The mount of a placeholder; fires once and carries no value.
    Mount(String),
}

impl InputSource {
    pub fn control(id: &str) -> Self {
        InputSource::Control(id.to_string())
    }

    pub fn mount(id: &str) -> Self {
        InputSource::Mount(id.to_string())
    }

    pub fn id(&self) -> &str {
        match self {
            InputSource::Control(id) | InputSource::Mount(id) => id,
        }
    }
}

/// New content for an output target.
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    Figure(ChartSpec),
    Text(String),
}

/// Current values of the controls sent with an update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InputValues(HashMap<String, String>);

impl InputValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, id: &str, value: &str) -> Self {
        self.0.insert(id.to_string(), value.to_string());
        self
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.0.get(id).map(String::as_str)
    }
}

/// Everything a handler may look at.
pub struct UpdateContext<'a> {
    pub dataset: &'a Dataset,
    pub output: &'a str,
    pub values: &'a InputValues,
}

impl<'a> UpdateContext<'a> {
    pub fn value(&self, input: &str) -> Result<&'a str, BindingError> {
        self.values
            .get(input)
            .ok_or_else(|| BindingError::MissingInput {
                output: self.output.to_string(),
                input: input.to_string(),
            })
    }

    /// Reads a Yes/No filter control.
    pub fn outcome(&self, input: &str) -> Result<Outcome, BindingError> {
        let value = self.value(input)?;
        match value {
            "Yes" => Ok(Outcome::Yes),
            "No" => Ok(Outcome::No),
            other => Err(BindingError::InvalidInput {
                input: input.to_string(),
                value: other.to_string(),
            }),
        }
    }
}

pub type Handler = Arc<dyn Fn(&UpdateContext<'_>) -> Result<Output, BindingError> + Send + Sync>;

#[derive(Clone)]
pub struct Binding {
    output: String,
    inputs: Vec<InputSource>,
    handler: Handler,
}

impl Binding {
    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn inputs(&self) -> &[InputSource] {
        &self.inputs
    }
}

/// Serializable view of one binding, as published to the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dependency {
    pub output: String,
    pub inputs: Vec<InputSource>,
}

#[derive(Clone, Default)]
pub struct Registry {
    bindings: Vec<Binding>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` as the producer of `output`. A later binding for
    /// the same output replaces the earlier one.
    pub fn bind<F>(&mut self, output: &str, inputs: Vec<InputSource>, handler: F) -> &mut Self
    where
        F: Fn(&UpdateContext<'_>) -> Result<Output, BindingError> + Send + Sync + 'static,
    {
        let binding = Binding {
            output: output.to_string(),
            inputs,
            handler: Arc::new(handler),
        };
        match self.bindings.iter_mut().find(|b| b.output == output) {
            Some(existing) => {
                warn!("output {:?} bound twice, keeping the latest binding", output);
                *existing = binding;
            }
            None => self.bindings.push(binding),
        }
        self
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    pub fn dependencies(&self) -> Vec<Dependency> {
        self.bindings
            .iter()
            .map(|b| Dependency {
                output: b.output.clone(),
                inputs: b.inputs.clone(),
            })
            .collect()
    }

    /// Outputs that must be recomputed when `input` changes.
    pub fn dependents_of(&self, input: &str) -> Vec<&str> {
        self.bindings
            .iter()
            .filter(|b| b.inputs.iter().any(|i| i.id() == input))
            .map(|b| b.output.as_str())
            .collect()
    }

    /// Runs the binding of `output` with the given control values.
    pub fn dispatch(
        &self,
        dataset: &Dataset,
        output: &str,
        values: &InputValues,
    ) -> Result<Output, BindingError> {
        let binding = self
            .bindings
            .iter()
            .find(|b| b.output == output)
            .ok_or_else(|| BindingError::UnknownOutput {
                output: output.to_string(),
            })?;

        for input in &binding.inputs {
            if let InputSource::Control(id) = input {
                if values.get(id).is_none() {
                    return Err(BindingError::MissingInput {
                        output: output.to_string(),
                        input: id.clone(),
                    });
                }
            }
        }

        debug!("dispatching {:?} with {:?}", output, values);
        let ctx = UpdateContext {
            dataset,
            output,
            values,
        };
        (binding.handler)(&ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry
            .bind("rows", vec![InputSource::mount("rows")], |ctx| {
                Ok(Output::Text(ctx.dataset.len().to_string()))
            })
            .bind("echo", vec![InputSource::control("picker")], |ctx| {
                Ok(Output::Text(ctx.outcome("picker")?.to_string()))
            });
        registry
    }

    #[test]
    fn dispatch_runs_the_bound_handler() {
        let dataset = Dataset::default();
        let out = registry()
            .dispatch(&dataset, "echo", &InputValues::new().with("picker", "Yes"))
            .unwrap();
        assert_eq!(out, Output::Text("Yes".to_string()));
    }

    #[test]
    fn mount_inputs_need_no_value() {
        let out = registry()
            .dispatch(&Dataset::default(), "rows", &InputValues::new())
            .unwrap();
        assert_eq!(out, Output::Text("0".to_string()));
    }

    #[test]
    fn failures_stay_local_to_one_binding() {
        let registry = registry();
        let dataset = Dataset::default();
        let bad = InputValues::new().with("picker", "Maybe");

        assert_eq!(
            registry.dispatch(&dataset, "echo", &bad),
            Err(BindingError::InvalidInput {
                input: "picker".to_string(),
                value: "Maybe".to_string()
            })
        );
        assert!(registry.dispatch(&dataset, "rows", &bad).is_ok());
    }

    #[test]
    fn missing_control_value_is_reported() {
        let err = registry()
            .dispatch(&Dataset::default(), "echo", &InputValues::new())
            .unwrap_err();
        assert!(matches!(err, BindingError::MissingInput { .. }));
    }

    #[test]
    fn unknown_output_is_reported() {
        let err = registry()
            .dispatch(&Dataset::default(), "nope", &InputValues::new())
            .unwrap_err();
        assert_eq!(
            err,
            BindingError::UnknownOutput {
                output: "nope".to_string()
            }
        );
    }

    #[test]
    fn rebinding_replaces_previous_handler() {
        let mut registry = registry();
        registry.bind("rows", vec![], |_| Ok(Output::Text("replaced".to_string())));
        assert_eq!(registry.len(), 2);
        assert_eq!(
            registry.dispatch(&Dataset::default(), "rows", &InputValues::new()),
            Ok(Output::Text("replaced".to_string()))
        );
    }

    #[test]
    fn dependents_follow_inputs() {
        let registry = registry();
        assert_eq!(registry.dependents_of("picker"), vec!["echo"]);
        assert!(registry.dependents_of("other").is_empty());
    }
}
