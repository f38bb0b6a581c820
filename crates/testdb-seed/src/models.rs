//! Domain types shared by the generators and the seeder.

use std::fmt;
use std::str::FromStr;

use rand::Rng;

/// User role, matching the `CHECK` constraint on `users.role`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Admin,
    Student,
    Docent,
}

impl Role {
    /// Every role, in the order the schema lists them.
    pub const ALL: [Role; 3] = [Role::Admin, Role::Student, Role::Docent];

    /// Returns the database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Student => "student",
            Role::Docent => "docent",
        }
    }

    /// Picks a role uniformly at random.
    pub fn random(rng: &mut impl Rng) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "student" => Ok(Role::Student),
            "docent" => Ok(Role::Docent),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// The tables owned by the seeder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Users,
    DnaSamples,
    Transactions,
    QueryLogs,
}

impl Table {
    /// All seeded tables, parents first.
    pub const ALL: [Table; 4] = [
        Table::Users,
        Table::DnaSamples,
        Table::Transactions,
        Table::QueryLogs,
    ];

    /// Returns the SQL table name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Users => "users",
            Table::DnaSamples => "dna_samples",
            Table::Transactions => "transactions",
            Table::QueryLogs => "query_logs",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
