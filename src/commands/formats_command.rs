//! Supported format listing command

use std::io::{self, Write};

use crate::commands::command_traits::Command;
use crate::errors::ExtractResult;
use crate::handlers::HandlerRegistry;

/// Command printing the registered document extensions
pub struct FormatsCommand<'a> {
    registry: &'a HandlerRegistry,
}

impl<'a> FormatsCommand<'a> {
    pub fn new(registry: &'a HandlerRegistry) -> Self {
        FormatsCommand { registry }
    }
}

impl<'a> Command for FormatsCommand<'a> {
    fn execute(&self) -> ExtractResult<()> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        for extension in self.registry.supported_extensions() {
            let handler = self.registry.resolve(&extension)?;
            writeln!(out, "{}\t{}", extension, handler.name())?;
        }
        Ok(())
    }
}
