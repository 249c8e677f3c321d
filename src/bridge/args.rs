// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// Builds the argument vector handed to a pipeline's entry point.
///
/// Positional arguments come first in the order added, followed by flags
/// and options. The program name is not part of the vector; the module
/// supplies it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineArgs {
    positional: Vec<String>,
    options: Vec<String>,
}

impl PipelineArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// A synthetic input path.
    pub fn input(mut self, path: impl Into<String>) -> Self {
        self.positional.push(path.into());
        self
    }

    /// An output by positional index, written as a decimal string.
    pub fn output_index(mut self, index: usize) -> Self {
        self.positional.push(index.to_string());
        self
    }

    /// A synthetic output path, for pipelines addressing outputs by path.
    pub fn output_path(mut self, path: impl Into<String>) -> Self {
        self.positional.push(path.into());
        self
    }

    pub fn memory_io(self) -> Self {
        self.flag("--memory-io")
    }

    pub fn information_only(self) -> Self {
        self.flag("--information-only")
    }

    pub fn quiet(self) -> Self {
        self.flag("--quiet")
    }

    pub fn flag(mut self, flag: impl Into<String>) -> Self {
        self.options.push(flag.into());
        self
    }

    pub fn option(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.push(name.into());
        self.options.push(value.into());
        self
    }

    pub fn build(self) -> Vec<String> {
        let mut args = self.positional;
        args.extend(self.options);
        args
    }
}

impl From<PipelineArgs> for Vec<String> {
    fn from(args: PipelineArgs) -> Self {
        args.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positionals_precede_flags() {
        let args = PipelineArgs::new()
            .input("0")
            .quiet()
            .output_index(0)
            .memory_io()
            .option("--threshold", "0.5")
            .build();
        assert_eq!(args, vec!["0", "0", "--quiet", "--memory-io", "--threshold", "0.5"]);
    }

    #[test]
    fn test_information_only() {
        let args: Vec<String> = PipelineArgs::new().information_only().into();
        assert_eq!(args, vec!["--information-only"]);
    }
}
