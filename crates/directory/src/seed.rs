//! Deterministic demo data: a small Serbian store tree with one manager and
//! two employees per node, plus a single superuser at the root.

use tracing::info;

use grocery_auth::Role;
use grocery_core::NodePath;

use crate::{NewPerson, Node, NodeRegistry, Person, PersonRegistry, RegistryError};

pub const DEMO_NODES: &[&str] = &[
    "/srbija",
    "/srbija/vojvodina",
    "/srbija/vojvodina/severnobacki-okrug",
    "/srbija/vojvodina/severnobacki-okrug/subotica",
    "/srbija/vojvodina/severnobacki-okrug/subotica/radnja-1",
    "/srbija/vojvodina/juznobacki-okrug",
    "/srbija/vojvodina/juznobacki-okrug/novi-sad",
    "/srbija/vojvodina/juznobacki-okrug/novi-sad/detelinara",
    "/srbija/vojvodina/juznobacki-okrug/novi-sad/detelinara/radnja-2",
    "/srbija/vojvodina/juznobacki-okrug/novi-sad/detelinara/radnja-3",
    "/srbija/vojvodina/juznobacki-okrug/novi-sad/liman",
    "/srbija/vojvodina/juznobacki-okrug/novi-sad/liman/radnja-4",
    "/srbija/vojvodina/juznobacki-okrug/novi-sad/liman/radnja-5",
    "/srbija/grad-beograd",
    "/srbija/grad-beograd/novi-beograd",
    "/srbija/grad-beograd/novi-beograd/bezanija",
    "/srbija/grad-beograd/novi-beograd/bezanija/radnja-6",
    "/srbija/grad-beograd/vracar",
    "/srbija/grad-beograd/vracar/neimar",
    "/srbija/grad-beograd/vracar/neimar/radnja-7",
    "/srbija/grad-beograd/vracar/crveni-krst",
    "/srbija/grad-beograd/vracar/crveni-krst/radnja-8",
    "/srbija/grad-beograd/vracar/crveni-krst/radnja-9",
];

pub const EMPLOYEES_PER_NODE: usize = 2;

/// Email of the seeded superuser.
pub const SUPERUSER_EMAIL: &str = "root@grocery.test";

/// What [`seed_demo`] wrote.
#[derive(Debug, Clone)]
pub struct SeedReport {
    pub nodes: usize,
    pub people: usize,
    pub superuser: Person,
}

/// Email of the seeded person at `path`. `index` 0 is the manager,
/// `1..=EMPLOYEES_PER_NODE` are employees.
pub fn demo_email(path: &NodePath, index: usize) -> String {
    let slug = path.segments().join(".");
    match index {
        0 => format!("manager.{slug}@grocery.test"),
        n => format!("employee{n}.{slug}@grocery.test"),
    }
}

/// People seeded at `path`, manager first.
pub fn demo_people_at(path: &NodePath) -> Vec<NewPerson> {
    let place = path.name();
    (0..=EMPLOYEES_PER_NODE)
        .map(|index| NewPerson {
            name: match index {
                0 => format!("Manager {place}"),
                n => format!("Employee {n} {place}"),
            },
            email: demo_email(path, index),
            node_path: path.clone(),
            role: if index == 0 { Role::Manager } else { Role::Employee },
        })
        .collect()
}

/// Populate empty registries with the demo tree.
pub async fn seed_demo(nodes: &dyn NodeRegistry, people: &dyn PersonRegistry) -> Result<SeedReport, RegistryError> {
    let paths = DEMO_NODES
        .iter()
        .map(|raw| NodePath::parse(raw))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| RegistryError::Corrupt(format!("demo node list: {e}")))?;

    let mut people_count = 0;
    for path in &paths {
        nodes.insert(Node::new(path.clone())).await?;
        for person in demo_people_at(path) {
            people.create(person).await?;
            people_count += 1;
        }
    }

    // Superusers are never assignable through the API, only seeded.
    let superuser = people
        .create(NewPerson {
            name: "Root".to_string(),
            email: SUPERUSER_EMAIL.to_string(),
            node_path: paths[0].clone(),
            role: Role::SuperUser,
        })
        .await?;
    people_count += 1;

    info!(nodes = paths.len(), people = people_count, "seeded demo directory");

    Ok(SeedReport {
        nodes: paths.len(),
        people: people_count,
        superuser,
    })
}
