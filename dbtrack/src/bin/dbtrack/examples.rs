use crate::commands::{decomment, diff, hacomment, history, init};

#[derive(Clone, Copy)]
pub struct ExampleGroup {
    pub title: &'static str,
    pub commands: &'static [&'static str],
}

#[derive(Clone, Copy)]
pub struct CommandExample {
    pub name: &'static str,
    pub groups: &'static [ExampleGroup],
}

pub fn command_examples() -> &'static [CommandExample] {
    &[
        CommandExample {
            name: "init",
            groups: init::EXAMPLES,
        },
        CommandExample {
            name: "diff",
            groups: diff::EXAMPLES,
        },
        CommandExample {
            name: "history",
            groups: history::EXAMPLES,
        },
        CommandExample {
            name: "decomment",
            groups: decomment::EXAMPLES,
        },
        CommandExample {
            name: "hacomment",
            groups: hacomment::EXAMPLES,
        },
    ]
}
