//! The two demo agents and their default session data.

use crate::agent::Agent;
use crate::session::State;
use crate::tools::builtin::current_time_tool;

pub const APP_NAME: &str = "Brandon Bot";
pub const USER_ID: &str = "brandon_hancock";

const QUESTION_ANSWERING_INSTRUCTION: &str = "
    You are a helpful assistant that answers questions about the user's preferences.

    Here is some information about the user:
    Name:
    {user_name}
    Preferences:
    {user_preferences}
    ";

const TOOL_AGENT_INSTRUCTION: &str = "
    You are a helpful assistant that can use the following tools:
    1. get_current_time: Get the current time in various formats.
    ";

/// Agent whose instruction is filled from `user_name` and `user_preferences`.
pub fn question_answering_agent(model: &str) -> Agent {
    Agent::new("question_answering_agent", model)
        .with_description("Question answering agent")
        .with_instruction(QUESTION_ANSWERING_INSTRUCTION)
}

/// Agent with the clock tool attached.
pub fn tool_agent(model: &str) -> Agent {
    Agent::new("greeting_agent", model)
        .with_description("Tool Agent.")
        .with_instruction(TOOL_AGENT_INSTRUCTION)
        .with_tool(current_time_tool())
}

/// Initial state used when no state file is given.
pub fn default_state() -> State {
    State::from([
        ("user_name", "Brandon Hancock"),
        (
            "user_preferences",
            "
        I like to play Pickleball, Disc Golf, and Tennis.
        My favorite food is Mexican.
        My favorite TV show is Game of Thrones.
        Loves it when people like and subscribe to his YouTube channel.
    ",
        ),
    ])
}
