use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use lambda_lang_core::lexer::Lexer;
use lambda_lang_core::parser::Parser;
use lambda_lang_interpreter::builtins;
use lambda_lang_interpreter::evaluator;

const PROMPT: &str = ">> ";

pub fn start() -> Result<(), ReadlineError> {
    // One global environment for the whole session, so bindings persist
    // across lines
    let environment = builtins::global_environment();

    let mut rl = DefaultEditor::new()?;

    loop {
        let readline = rl.readline(PROMPT);

        let line = match readline {
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                continue; // Clear line
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            }
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
            Ok(line) => {
                rl.add_history_entry(line.as_str())?;
                line
            }
        };

        let program = match Parser::new(Lexer::new(&line)).parse_program() {
            Ok(program) => program,
            Err(err) => {
                println!("{}", err);
                continue;
            }
        };

        match evaluator::evaluate(&program, &environment) {
            Ok(value) => println!("{}", value),
            Err(err) => println!("{}", err),
        }
    }
    Ok(())
}
