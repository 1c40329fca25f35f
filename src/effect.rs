use bevy::{platform::collections::HashMap, prelude::*};
use evalexpr::{ContextWithMutableVariables, DefaultNumericTypes, HashMapContext, Node, Value as EvalValue};
use log::warn;
use serde::Deserialize;

use crate::actor::ActorModifiers;
use crate::modifier::PlayerStatModifier;
use crate::modifier_error::EffectError;
use crate::modifier_key::ModifierKey;

/// Named numbers an effect's amount expression can refer to, per actor.
#[derive(Component, Debug, Clone, Default)]
pub struct EffectVariables(HashMap<String, f64>);

impl EffectVariables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: &str, value: f64) -> &mut Self {
        self.0.insert(name.to_string(), value);
        self
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AmountArg {
    Number(f64),
    Expression(String),
}

/// Raw arguments of an `add_stat` effect as they appear in effect config.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct AddStatArgs {
    pub stat: Option<String>,
    pub amount: Option<AmountArg>,
}

/// Adds a stat modifier while an effect is active and removes it when the
/// effect ends.
#[derive(Debug, Clone)]
pub struct AddStatEffect {
    stat: String,
    expression: String,
    amount: Node<DefaultNumericTypes>,
}

impl AddStatEffect {
    pub const ID: &'static str = "add_stat";

    pub fn compile(args: &AddStatArgs) -> Result<Self, EffectError> {
        let stat = args.stat.clone().filter(|s| !s.is_empty()).ok_or(EffectError::MissingStat)?;
        let expression = match args.amount.as_ref().ok_or(EffectError::MissingAmount)? {
            AmountArg::Number(value) => value.to_string(),
            AmountArg::Expression(expression) => expression.clone(),
        };

        let amount = evalexpr::build_operator_tree(&expression).map_err(|err| EffectError::InvalidExpression {
            expression: expression.clone(),
            details: err.to_string(),
        })?;

        Ok(Self { stat, expression, amount })
    }

    pub fn stat_id(&self) -> &str {
        &self.stat
    }

    /// Evaluates the amount for one actor. Variables the actor does not
    /// define count as zero. The result is truncated to a whole number.
    pub fn try_evaluate_amount(&self, variables: Option<&EffectVariables>) -> Result<f64, EffectError> {
        let evaluation_error = |details: String| EffectError::Evaluation {
            expression: self.expression.clone(),
            details,
        };

        let mut context: HashMapContext<DefaultNumericTypes> = HashMapContext::new();
        for name in self.amount.iter_variable_identifiers() {
            let value = variables.and_then(|vars| vars.get(name)).unwrap_or(0.0);
            context
                .set_value(name.to_string(), EvalValue::from_float(value))
                .map_err(|err| evaluation_error(err.to_string()))?;
        }

        let amount = self
            .amount
            .eval_number_with_context(&context)
            .map_err(|err| evaluation_error(err.to_string()))?;
        Ok(amount.trunc())
    }

    /// [`AddStatEffect::try_evaluate_amount`], logging failures and falling
    /// back to zero.
    pub fn evaluate_amount(&self, variables: Option<&EffectVariables>) -> f64 {
        self.try_evaluate_amount(variables).unwrap_or_else(|err| {
            warn!("{}", err);
            0.0
        })
    }

    /// Applies the effect to `actor` under `key`. Returns `false` without
    /// touching the actor when the stat is not registered.
    pub fn enable(
        &self,
        actor: Entity,
        key: ModifierKey,
        variables: Option<&EffectVariables>,
        modifiers: &mut ActorModifiers,
    ) -> bool {
        let Some(stat) = modifiers.registry().get_by_id(&self.stat) else {
            warn!("add_stat effect refers to unknown stat '{}'", self.stat);
            return false;
        };

        let amount = self.evaluate_amount(variables);
        modifiers.add_stat_modifier(actor, &PlayerStatModifier::new(key, stat, amount));
        true
    }

    /// Removes the effect's modifier. The stat is recomputed on the next
    /// frame rather than immediately.
    pub fn disable(&self, actor: Entity, key: &ModifierKey, modifiers: &mut ActorModifiers) {
        if let Some(stat) = modifiers.remove_stat_modifier_with_update(actor, key, false) {
            modifiers.schedule_stat_update(actor, stat);
        }
    }
}
