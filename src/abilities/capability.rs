//! Abilities domain: roles and the role -> permitted ability table.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// Fixed character archetype. Never changes after spawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Role {
    Decoy,
    Support,
    Observer,
    Tank,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Decoy, Role::Support, Role::Observer, Role::Tank];
}

/// Input-driven abilities. Fall recovery is event-driven and not gated here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Ability {
    Sprint,
    Dash,
    Teleport,
    Bounce,
    Grapple,
    Steady,
    Link,
}

impl Ability {
    pub const ALL: [Ability; 7] = [
        Ability::Sprint,
        Ability::Dash,
        Ability::Teleport,
        Ability::Bounce,
        Ability::Grapple,
        Ability::Steady,
        Ability::Link,
    ];
}

/// What one role may do.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RoleCapabilities {
    pub abilities: HashSet<Ability>,
    /// Hovering roles ignore hazards unless they are grappling.
    pub hovers: bool,
}

impl RoleCapabilities {
    pub fn new(abilities: impl IntoIterator<Item = Ability>, hovers: bool) -> Self {
        Self {
            abilities: abilities.into_iter().collect(),
            hovers,
        }
    }

    pub fn permits(&self, ability: Ability) -> bool {
        self.abilities.contains(&ability)
    }
}

/// Role permission matrix. Rebalancing is a data change, loaded from
/// `roles.ron`; `Default` carries the shipped table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityTable {
    roles: HashMap<Role, RoleCapabilities>,
}

impl CapabilityTable {
    pub fn new(roles: HashMap<Role, RoleCapabilities>) -> Self {
        Self { roles }
    }

    pub fn permits(&self, role: Role, ability: Ability) -> bool {
        self.roles
            .get(&role)
            .is_some_and(|caps| caps.permits(ability))
    }

    /// Roles missing from the table get no abilities at all.
    pub fn for_role(&self, role: Role) -> RoleCapabilities {
        self.roles.get(&role).cloned().unwrap_or_default()
    }

    pub fn roles(&self) -> impl Iterator<Item = (&Role, &RoleCapabilities)> {
        self.roles.iter()
    }
}

impl Default for CapabilityTable {
    fn default() -> Self {
        use Ability::*;

        let roles = HashMap::from([
            (
                Role::Decoy,
                RoleCapabilities::new([Sprint, Dash, Bounce, Grapple], true),
            ),
            (
                Role::Support,
                RoleCapabilities::new([Sprint, Dash, Teleport, Link], true),
            ),
            (
                Role::Observer,
                RoleCapabilities::new([Sprint, Teleport, Bounce, Steady], false),
            ),
            (
                Role::Tank,
                RoleCapabilities::new([Sprint, Grapple, Steady, Link], false),
            ),
        ]);
        Self { roles }
    }
}
