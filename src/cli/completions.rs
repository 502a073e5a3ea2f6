use clap::Parser;

/// Arguments for completions command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Generate bash completions:\n    spice-bundler completions bash > ~/.bash_completion.d/spice-bundler\n\n\
                  Generate zsh completions:\n    spice-bundler completions zsh > ~/.zfunc/_spice-bundler\n\n\
                  Generate fish completions:\n    spice-bundler completions fish > ~/.config/fish/completions/spice-bundler.fish")]
pub struct CompletionsArgs {
    /// Shell type (bash, elvish, fish, powershell, zsh)
    pub shell: String,
}
