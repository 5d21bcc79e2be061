//! Stage personas

/// Role, goal and backstory of a stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Persona {
    /// Role name, also used as the stage's identity
    pub role: String,
    /// What the stage is trying to achieve
    pub goal: String,
    /// Short background that frames the answers
    pub backstory: String,
}

impl Persona {
    /// Create a persona
    pub fn new(
        role: impl Into<String>,
        goal: impl Into<String>,
        backstory: impl Into<String>,
    ) -> Self {
        Self {
            role: role.into(),
            goal: goal.into(),
            backstory: backstory.into(),
        }
    }

    /// System prompt presenting the persona to the model
    pub fn system_prompt(&self) -> String {
        format!(
            "You are {}. {}\nYour personal goal is: {}",
            self.role, self.backstory, self.goal
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt() {
        let persona = Persona::new(
            "Strategic Stock Trader",
            "Decide Buy/Sell/Hold based on analysis.",
            "Experienced trader.",
        );
        assert_eq!(
            persona.system_prompt(),
            "You are Strategic Stock Trader. Experienced trader.\n\
             Your personal goal is: Decide Buy/Sell/Hold based on analysis."
        );
    }
}
