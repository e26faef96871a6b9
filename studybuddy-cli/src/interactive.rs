//! Menu loop that walks the same screens a touch front end would show.

use std::path::PathBuf;

use dialoguer::{Confirm, Input, Select};
use studybuddy_appcore::{AppService, ServiceError};
use studybuddy_capture::ImageAdjustments;
use studybuddy_core::types::AppScreen;
use studybuddy_engine::session::SolveOutcome;

use crate::display;
use crate::{spinner, spinner_hook};

pub async fn run(svc: &AppService) -> anyhow::Result<()> {
    loop {
        let state = svc.snapshot().map_err(crate::user_error)?;
        println!("\n== {} ==", state.screen);

        let keep_going = match state.screen {
            AppScreen::Home => home(svc).await?,
            AppScreen::Capture => capture(svc).await?,
            AppScreen::Editing => editing(svc).await?,
            AppScreen::Display => {
                if let Some(result) = &state.current {
                    println!("{}", display::render_result(result));
                }
                solution(svc)?
            }
            AppScreen::History => history(svc)?,
        };

        if !keep_going {
            return Ok(());
        }
    }
}

// Errors the user can act on are printed and the loop continues; prompt failures abort.
fn report(res: Result<(), ServiceError>) {
    if let Err(e) = res {
        log::debug!("interactive action failed: {e:?}");
        eprintln!("{}", e.user_message());
    }
}

fn after_solve(res: Result<SolveOutcome, ServiceError>) {
    match res {
        Ok(SolveOutcome::Solved { warning, .. }) => {
            if let Some(w) = warning {
                eprintln!("warning: {w}");
            }
        }
        Ok(SolveOutcome::Failed { message }) => eprintln!("{message}"),
        Err(e) => report(Err(e)),
    }
}

async fn ask_typed_question(svc: &AppService) -> anyhow::Result<()> {
    let text: String = Input::new()
        .with_prompt("Your question")
        .allow_empty(true)
        .interact_text()?;

    let pb = spinner();
    let res = svc.solve_text(&text, spinner_hook(&pb)).await;
    pb.finish_and_clear();
    after_solve(res);
    Ok(())
}

async fn home(svc: &AppService) -> anyhow::Result<bool> {
    let choice = Select::new()
        .with_prompt("What would you like to do?")
        .items(&["Scan a homework photo", "Type a question", "History", "Quit"])
        .default(0)
        .interact()?;

    match choice {
        0 => report(svc.request_scan()),
        1 => ask_typed_question(svc).await?,
        2 => report(svc.navigate_history().map(|_| ())),
        _ => return Ok(false),
    }
    Ok(true)
}

async fn capture(svc: &AppService) -> anyhow::Result<bool> {
    let choice = Select::new()
        .with_prompt("Capture")
        .items(&["Open an image file", "Type the question instead", "Cancel"])
        .default(0)
        .interact()?;

    match choice {
        0 => {
            let path: String = Input::new().with_prompt("Image path").interact_text()?;
            report(svc.capture_image_file(&PathBuf::from(path.trim())));
        }
        1 => ask_typed_question(svc).await?,
        _ => report(svc.cancel_capture()),
    }
    Ok(true)
}

async fn editing(svc: &AppService) -> anyhow::Result<bool> {
    let choice = Select::new()
        .with_prompt("Edit photo")
        .items(&["Solve as is", "Adjust and solve", "Retake"])
        .default(0)
        .interact()?;

    let adjustments = match choice {
        0 => ImageAdjustments::default(),
        1 => {
            let brightness: u16 = Input::new()
                .with_prompt("Brightness % (50-200)")
                .default(100)
                .interact_text()?;
            let contrast: u16 = Input::new()
                .with_prompt("Contrast % (50-200)")
                .default(100)
                .interact_text()?;
            let grayscale = Confirm::new()
                .with_prompt("Black and white?")
                .default(false)
                .interact()?;
            ImageAdjustments::new(brightness, contrast, grayscale)
        }
        _ => {
            report(svc.cancel_edit());
            return Ok(true);
        }
    };

    let pb = spinner();
    let res = svc.confirm_edit(adjustments, spinner_hook(&pb)).await;
    pb.finish_and_clear();
    after_solve(res);
    Ok(true)
}

fn solution(svc: &AppService) -> anyhow::Result<bool> {
    let choice = Select::new()
        .items(&["Back to home", "History", "Quit"])
        .default(0)
        .interact()?;

    match choice {
        0 => report(svc.navigate_home()),
        1 => report(svc.navigate_history().map(|_| ())),
        _ => return Ok(false),
    }
    Ok(true)
}

fn history(svc: &AppService) -> anyhow::Result<bool> {
    let items = match svc.history() {
        Ok(items) => items,
        Err(e) => {
            report(Err(e));
            return Ok(true);
        }
    };

    if items.is_empty() {
        println!("No saved answers yet.");
    }

    let mut labels: Vec<String> = items.iter().map(display::history_label).collect();
    let back = labels.len();
    labels.push("Back to home".into());
    let clear = (!items.is_empty()).then(|| {
        labels.push("Clear all".into());
        back + 1
    });

    let choice = Select::new()
        .with_prompt("History")
        .items(&labels)
        .default(0)
        .interact()?;

    if choice < back {
        let id = &items[choice].id;
        let action = Select::new()
            .items(&["Open", "Delete", "Cancel"])
            .default(0)
            .interact()?;
        match action {
            0 => report(svc.select_history_item(id).map(|_| ())),
            1 => report(svc.delete_history_item(id)),
            _ => {}
        }
    } else if Some(choice) == clear {
        let confirmed = Confirm::new()
            .with_prompt("Delete all saved answers?")
            .default(false)
            .interact()?;
        if confirmed {
            report(svc.clear_history());
        }
    } else {
        report(svc.navigate_home());
    }
    Ok(true)
}
