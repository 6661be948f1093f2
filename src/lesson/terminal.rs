//! Line-oriented front-end for a [`LessonSession`], used by `sui-garage lesson`.

use std::io::{self, BufRead, Write};

use super::{LessonSession, Phase};

const HELP: &str = "\
commands:
  :show    print the chapter and the current buffer
  :check   check the buffer
  :answer  load the expected code
  :retry   restore the starter code
  :clear   empty the buffer
  :next    go to the next chapter (after a passing check)
  :prev    go back one chapter
  :quit    leave
any other line is appended to the buffer
";

pub fn run<R: BufRead, W: Write>(
    session: &mut LessonSession<'_>,
    input: R,
    mut out: W,
) -> io::Result<()> {
    print_chapter(session, &mut out)?;
    write!(out, "{}", HELP)?;

    for line in input.lines() {
        let line = line?;
        match line.trim() {
            ":quit" | ":q" => break,
            ":help" => write!(out, "{}", HELP)?,
            ":show" => print_chapter(session, &mut out)?,
            ":check" => {
                session.check_answer();
                write!(out, "{}", session.terminal_output())?;
                if session.phase() == Phase::Passed {
                    if session.is_last() {
                        writeln!(out, "You finished the last chapter.")?;
                    } else {
                        writeln!(out, "Chapter unlocked, type :next to continue.")?;
                    }
                }
            }
            ":answer" => {
                session.show_answer();
                writeln!(out, "{}", session.code())?;
            }
            ":retry" => {
                session.try_again();
                writeln!(out, "Buffer restored.")?;
            }
            ":clear" => {
                session.edit(String::new());
            }
            ":next" => match session.advance() {
                Ok(_) => print_chapter(session, &mut out)?,
                Err(err) => writeln!(out, "{}", err)?,
            },
            ":prev" => match session.retreat() {
                Ok(_) => print_chapter(session, &mut out)?,
                Err(err) => writeln!(out, "{}", err)?,
            },
            _ => {
                let mut code = session.code().to_string();
                code.push_str(&line);
                code.push('\n');
                session.edit(code);
            }
        }
        out.flush()?;
    }

    Ok(())
}

fn print_chapter<W: Write>(session: &LessonSession<'_>, out: &mut W) -> io::Result<()> {
    let chapter = session.chapter();
    writeln!(out, "== Chapter {}: {} ==", chapter.id, chapter.title)?;
    writeln!(out, "{}", chapter.content)?;
    writeln!(out, "--- buffer ---")?;
    for (idx, line) in session.code().lines().enumerate() {
        writeln!(out, "{:>3} | {}", idx + 1, line)?;
    }
    writeln!(out, "--------------")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lesson::chapters;

    fn drive(script: &str) -> (String, usize) {
        let mut session = LessonSession::new(chapters()).unwrap();
        let mut out = Vec::new();
        run(&mut session, script.as_bytes(), &mut out).unwrap();
        (String::from_utf8(out).unwrap(), session.index())
    }

    #[test]
    fn typed_answer_passes_and_advances() {
        let (out, index) = drive(":clear\nmodule garage::car {\n}\n:check\n:next\n:quit\n");
        assert!(out.contains("Success! All checks passed."));
        assert!(out.contains("== Chapter 2: Building the Car =="));
        assert_eq!(index, 1);
    }

    #[test]
    fn next_is_refused_before_a_pass() {
        let (out, index) = drive(":check\n:next\n");
        assert!(out.contains("error[line 1]"));
        assert!(out.contains("check your answer before moving on"));
        assert_eq!(index, 0);
    }

    #[test]
    fn answer_then_prev_round_trips() {
        let (out, index) = drive(":answer\n:next\n:prev\n:prev\n");
        assert!(out.contains("already at the first chapter"));
        assert_eq!(index, 0);
    }
}
