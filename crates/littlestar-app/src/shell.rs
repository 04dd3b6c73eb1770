//! The interactive terminal shell.

use std::io::Write;

use anyhow::Result;
use littlestar_core::{Lesson, Topic};
use littlestar_genai::GenAiClient;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{error, warn};

use crate::session::Session;
use crate::speaker::Speaker;

type InputLines = Lines<BufReader<Stdin>>;

/// Run the shell until the student quits or stdin closes.
pub async fn run(client: GenAiClient, speaker: Speaker) -> Result<()> {
    let mut session = Session::new(client.clone());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("⭐ Welcome to Little Star English!");
    print_menu(&session.topics);

    loop {
        let Some(input) = prompt(&mut lines, "> ").await? else {
            break;
        };
        let input = input.trim().to_string();
        if input.is_empty() {
            continue;
        }

        // Audio output is gated on a first user interaction.
        speaker.resume_audio();

        match input.as_str() {
            "q" | "quit" => break,
            "m" | "menu" => print_menu(&session.topics),
            "c" | "chat" => chat_mode(&mut session, &speaker, &mut lines).await?,
            other => {
                let topic = other
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| session.topic_by_number(n))
                    .cloned();

                if let Some(topic) = topic {
                    lesson_flow(&client, &mut session, &speaker, &mut lines, &topic).await?;
                } else {
                    println!("Type a topic number, 'chat', 'menu', or 'quit'.");
                }
            }
        }
    }

    speaker.stop();
    println!("Goodbye! 🌟");
    Ok(())
}

fn print_menu(topics: &[Topic]) {
    println!("\nWhat would you like to learn about today?");
    for (i, topic) in topics.iter().enumerate() {
        println!("  {}. {} {}", i + 1, topic.emoji, topic.title);
    }
    println!("Pick a number, or type 'chat' to talk with Star.");
}

async fn lesson_flow(
    client: &GenAiClient,
    session: &mut Session,
    speaker: &Speaker,
    lines: &mut InputLines,
    topic: &Topic,
) -> Result<()> {
    println!("\nMaking a lesson about {} {} ...", topic.title, topic.emoji);

    let lesson = match client.generate_lesson(topic).await {
        Ok(lesson) => lesson,
        Err(e) => {
            error!("Lesson generation failed: {e}");
            println!("Oh no, I couldn't make that lesson. Let's try again later!");
            return Ok(());
        }
    };

    print_lesson(&lesson);

    // Read the lesson aloud while the student follows the text.
    if let Err(e) = speaker.speak(&lesson.narration()).await {
        warn!("Could not read the lesson aloud: {e}");
        println!("(My voice is a little scratchy today, let's read together!)");
    }

    quiz(&lesson, speaker, lines).await?;
    session.lesson = Some(lesson);
    Ok(())
}

fn print_lesson(lesson: &Lesson) {
    println!("\n✨ {} ✨", lesson.title);

    println!("\n📖 New words:");
    for item in &lesson.vocabulary {
        println!("  {} = {}", item.word, item.meaning);
        println!("     \"{}\"", item.example);
    }

    println!("\n📚 Story time:");
    for paragraph in &lesson.story {
        println!("  {paragraph}");
    }
}

async fn quiz(lesson: &Lesson, speaker: &Speaker, lines: &mut InputLines) -> Result<()> {
    if lesson.quiz.is_empty() {
        return Ok(());
    }

    println!("\n📝 Quiz time!");
    let mut correct = 0;

    for (i, question) in lesson.quiz.iter().enumerate() {
        println!("\n{}. {}", i + 1, question.question);
        for (j, option) in question.options.iter().enumerate() {
            println!("   {}) {}", j + 1, option);
        }

        let Some(answer) = prompt(lines, "your answer: ").await? else {
            return Ok(());
        };
        let picked = answer.trim().parse::<usize>().ok().and_then(|n| n.checked_sub(1));

        if picked == Some(question.answer_index) {
            correct += 1;
            println!("✅ Yes! Great job!");
        } else if let Some(option) = question.correct_option() {
            println!("❌ Not quite! The answer was \"{option}\".");
        }
    }

    let summary = format!("You got {correct} out of {} right!", lesson.quiz.len());
    println!("\n🏆 {summary}");
    if let Err(e) = speaker.speak(&summary).await {
        warn!("Could not speak the quiz summary: {e}");
    }
    Ok(())
}

async fn chat_mode(session: &mut Session, speaker: &Speaker, lines: &mut InputLines) -> Result<()> {
    println!("\n💬 Chat with Star! (type 'back' to return)");

    loop {
        let Some(input) = prompt(lines, "you: ").await? else {
            return Ok(());
        };
        let input = input.trim();
        if input.is_empty() {
            continue;
        }
        if input == "back" {
            speaker.stop();
            return Ok(());
        }

        match session.chat.send(input).await {
            Ok(reply) => {
                println!("star: {}", reply.text);
                if let Err(e) = speaker.speak(&reply.text).await {
                    warn!("Could not speak the reply: {e}");
                }
            }
            Err(e) => {
                error!("Chat turn failed: {e}");
                println!("star: Sorry, I didn't catch that. Can you say it again?");
            }
        }
    }
}

async fn prompt(lines: &mut InputLines, text: &str) -> Result<Option<String>> {
    print!("{text}");
    std::io::stdout().flush()?;
    Ok(lines.next_line().await?)
}
