//! Behaviour-driven step definitions driving the CLI scenarios.

use super::helpers::{BIRMINGHAM, StubServices, Workspace, run_command_line, text};
use super::*;
use pois_core::test_support::remote_place;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::RefCell;

struct CliWorld {
    workspace: Workspace,
    services: RefCell<StubServices>,
    output: RefCell<Vec<u8>>,
    result: RefCell<Option<Result<(), CliError>>>,
}

impl CliWorld {
    fn new() -> Self {
        Self {
            workspace: Workspace::new(),
            services: RefCell::new(StubServices::default()),
            output: RefCell::new(Vec::new()),
            result: RefCell::new(None),
        }
    }

    fn error(&self) -> std::cell::Ref<'_, CliError> {
        std::cell::Ref::map(self.result.borrow(), |result| {
            result
                .as_ref()
                .expect("result recorded")
                .as_ref()
                .expect_err("expected error")
        })
    }
}

#[fixture]
fn world() -> CliWorld {
    CliWorld::new()
}

fn unquote(raw: &str) -> String {
    raw.trim().trim_matches('"').to_owned()
}

#[given("a saved location in Birmingham")]
fn saved_location(#[from(world)] world: &CliWorld) {
    world.workspace.save_location(BIRMINGHAM);
    world.workspace.save_radius(1500);
}

#[given("the places API knows {first} and {second}")]
fn places_known(#[from(world)] world: &CliWorld, first: String, second: String) {
    world.services.replace(StubServices::with_places(vec![
        remote_place(&unquote(&first)),
        remote_place(&unquote(&second)),
    ]));
}

#[given("{name} is a favourite")]
fn is_favourite(#[from(world)] world: &CliWorld, name: String) {
    world.workspace.favourite(&remote_place(&unquote(&name)));
}

#[when("I run {line}")]
fn run_line(#[from(world)] world: &CliWorld, line: String) {
    let services = world.services.borrow();
    let mut output = world.output.borrow_mut();
    let outcome = run_command_line(&world.workspace, &unquote(&line), &services, &mut output);
    world.result.replace(Some(outcome));
}

#[then("the command succeeds")]
fn command_succeeds(#[from(world)] world: &CliWorld) {
    let borrowed = world.result.borrow();
    let result = borrowed.as_ref().expect("result recorded");
    if let Err(err) = result {
        panic!("expected success, found {err:?}");
    }
}

#[then("the output contains {expected}")]
fn output_contains(#[from(world)] world: &CliWorld, expected: String) {
    let printed = text(&world.output.borrow());
    let expected = unquote(&expected);
    assert!(printed.contains(&expected), "{printed:?} lacks {expected:?}");
}

#[then("the stored favourites are {expected}")]
fn stored_favourites(#[from(world)] world: &CliWorld, expected: String) {
    let names: Vec<String> = world
        .workspace
        .favourites()
        .into_iter()
        .map(|place| place.name)
        .collect();
    assert_eq!(names, vec![unquote(&expected)]);
}

#[then("the command fails because {id} is not a favourite")]
fn fails_unknown_favourite(#[from(world)] world: &CliWorld, id: String) {
    match &*world.error() {
        CliError::UnknownFavourite { id: missing } => assert_eq!(*missing, unquote(&id)),
        other => panic!("expected UnknownFavourite, found {other:?}"),
    }
}

#[then("the command fails because {field} is missing")]
fn fails_missing_argument(#[from(world)] world: &CliWorld, field: String) {
    match &*world.error() {
        CliError::MissingArgument { field: missing, .. } => {
            assert_eq!(*missing, unquote(&field));
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

macro_rules! register_cli_scenario {
    ($fn_name:ident, $scenario_title:literal) => {
        #[scenario(path = "tests/features/cli_commands.feature", name = $scenario_title)]
        fn $fn_name(#[from(world)] world: CliWorld) {
            let _ = world;
        }
    };
}

register_cli_scenario!(search_favourites_result, "favouriting a search result");
register_cli_scenario!(unfavourite_unknown_place, "unfavouriting an unknown place");
register_cli_scenario!(unfavourite_by_id, "removing a favourite by identifier");
register_cli_scenario!(directions_from_saved_location, "directions start at the saved location");
register_cli_scenario!(search_without_api_key, "searching without an API key");
