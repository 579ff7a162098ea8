//! CLI commands

use anyhow::{Context as _, Result, bail};
use clap::Subcommand;
use qroom_core::{AnswerCache, CachedAnswer, FileStorage, KeyValueStorage};
use qroom_http::QroomClient;
use qroom_http::types::{
    CreateGroupRequest, CreateQaPostRequest, CreateQuizRequest, LoginRequest, SignupRequest,
    SubmitQuizRequest, SubmittedAnswer,
};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use crate::config;

#[derive(Subcommand)]
pub enum Commands {
    /// Create an account
    Signup {
        nickname: String,

        #[arg(long, env = "QROOM_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Log in and store the session in the data directory
    Login {
        nickname: String,

        #[arg(long, env = "QROOM_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Forget the stored session
    Logout,

    /// Show the logged-in user
    Whoami,

    /// Show groups, open Q&A boards and upcoming exams
    Home,

    /// Study group operations
    Group {
        #[command(subcommand)]
        command: GroupCommands,
    },

    /// Study material operations
    Pdf {
        #[command(subcommand)]
        command: PdfCommands,
    },

    /// Quiz operations
    Quiz {
        #[command(subcommand)]
        command: QuizCommands,
    },

    /// Q&A board operations
    Qa {
        #[command(subcommand)]
        command: QaCommands,
    },
}

#[derive(Subcommand)]
pub enum GroupCommands {
    /// Create a group and print its join code
    Create {
        name: String,

        /// Exam date, e.g. 2025-06-01
        #[arg(long)]
        exam_date: String,

        /// Cover image number
        #[arg(long, default_value = "1")]
        image: i32,
    },

    /// Join a group by code
    Join { code: String },

    /// Show a group's members, materials, quizzes and ranking
    Show { group_id: i64 },

    Leave { group_id: i64 },

    Delete { group_id: i64 },
}

#[derive(Subcommand)]
pub enum PdfCommands {
    /// Upload a PDF into a group
    Upload { group_id: i64, file: PathBuf },

    /// List a group's PDFs
    List { group_id: i64 },
}

#[derive(Subcommand)]
pub enum QuizCommands {
    /// Generate a quiz from an uploaded PDF
    Create {
        pdf_id: i64,

        #[arg(long, default_value = "normal")]
        difficulty: String,

        /// Question kinds, comma separated (OX, 객관식, 단답형)
        #[arg(long, value_delimiter = ',', default_value = "OX")]
        types: Vec<String>,

        #[arg(long, default_value = "10")]
        count: u32,
    },

    /// Start an attempt
    Start { quiz_id: i64 },

    /// Show the questions of a quiz
    Show { quiz_id: i64 },

    /// Record an answer locally; nothing is sent until `submit`
    Answer {
        quiz_id: i64,
        question_id: i64,
        value: String,
    },

    /// Submit the recorded answers
    Submit { quiz_id: i64 },

    /// Show a graded attempt
    Result { quiz_result_id: i64 },
}

#[derive(Subcommand)]
pub enum QaCommands {
    /// Show a quiz's review and Q&A board
    Room { quiz_id: i64 },

    /// Post a question to a board
    Post {
        board_id: i64,
        content: String,

        #[arg(long)]
        anonymous: bool,
    },
}

/// Client and local caches shared by every command
struct Context {
    client: QroomClient,
    answers: AnswerCache,
}

impl Context {
    fn new(data_dir: &Path, config_file: Option<&Path>) -> Result<Self> {
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("creating data directory {}", data_dir.display()))?;

        let settings = config::load_settings(config_file, data_dir)?;
        debug!(base_url = %settings.base_url, "Loaded client settings");

        let storage: Arc<dyn KeyValueStorage> =
            Arc::new(FileStorage::open(data_dir.join("session.json")));
        let client = QroomClient::builder()
            .settings(&settings)
            .storage(Arc::clone(&storage))
            .build()?;

        Ok(Self {
            client,
            answers: AnswerCache::new(storage),
        })
    }
}

impl Commands {
    pub async fn execute(self, data_dir: PathBuf, config_file: Option<PathBuf>) -> Result<()> {
        let ctx = Context::new(&data_dir, config_file.as_deref())?;

        match self {
            Commands::Signup { nickname, password } => {
                let response = ctx
                    .client
                    .signup(&SignupRequest {
                        nickname,
                        password: password.clone(),
                        password_check: password,
                    })
                    .await?;
                println!(
                    "Signed up as {} (id {})",
                    response.user.nickname, response.user.id
                );
                Ok(())
            }
            Commands::Login { nickname, password } => {
                let response = ctx
                    .client
                    .login_and_persist(&LoginRequest { nickname, password })
                    .await?;
                println!("Logged in as {}", response.user.nickname);
                Ok(())
            }
            Commands::Logout => {
                ctx.client.logout();
                println!("Logged out");
                Ok(())
            }
            Commands::Whoami => {
                match (ctx.client.is_authenticated(), ctx.client.session().user()) {
                    (true, Some(user)) => println!("{} (id {})", user.nickname, user.id),
                    (true, None) => println!("Logged in"),
                    (false, _) => println!("Not logged in"),
                }
                Ok(())
            }
            Commands::Home => {
                let home = ctx.client.home().await?;
                println!("Groups:");
                for group in &home.groups {
                    println!(
                        "  [{}] {} - exam {} - {} members",
                        group.id, group.name, group.exam_date, group.member_count
                    );
                }
                println!("Q&A boards:");
                for board in &home.qa_board {
                    println!("  [{}] {} ({})", board.id, board.title, board.progress);
                }
                println!("Exams:");
                for exam in &home.exam_schedule {
                    println!("  {} on {}", exam.course_name, exam.exam_date);
                }
                Ok(())
            }
            Commands::Group { command } => command.execute(&ctx).await,
            Commands::Pdf { command } => command.execute(&ctx).await,
            Commands::Quiz { command } => command.execute(&ctx).await,
            Commands::Qa { command } => command.execute(&ctx).await,
        }
    }
}

impl GroupCommands {
    async fn execute(self, ctx: &Context) -> Result<()> {
        match self {
            GroupCommands::Create {
                name,
                exam_date,
                image,
            } => {
                let group = ctx
                    .client
                    .create_group(&CreateGroupRequest {
                        name,
                        exam_date,
                        image_num: image,
                    })
                    .await?;
                println!(
                    "Created group {} (id {}), join code {}",
                    group.group_name, group.id, group.group_code
                );
            }
            GroupCommands::Join { code } => {
                let joined = ctx.client.join_group(code).await?;
                println!("Joined group {}", joined.group_id);
            }
            GroupCommands::Show { group_id } => {
                let detail = ctx.client.group_detail(group_id).await?;
                print_json(&detail)?;
            }
            GroupCommands::Leave { group_id } => {
                ctx.client.leave_group(group_id).await?;
                println!("Left group {group_id}");
            }
            GroupCommands::Delete { group_id } => {
                ctx.client.delete_group(group_id).await?;
                println!("Deleted group {group_id}");
            }
        }
        Ok(())
    }
}

impl PdfCommands {
    async fn execute(self, ctx: &Context) -> Result<()> {
        match self {
            PdfCommands::Upload { group_id, file } => {
                let data =
                    std::fs::read(&file).with_context(|| format!("reading {}", file.display()))?;
                let file_name = file
                    .file_name()
                    .and_then(|name| name.to_str())
                    .context("file path has no usable file name")?
                    .to_string();

                info!(group_id, %file_name, bytes = data.len(), "Uploading PDF");
                let uploaded = ctx.client.upload_pdf(group_id, file_name, data).await?;
                println!("Uploaded {} (id {})", uploaded.file_name, uploaded.id);
            }
            PdfCommands::List { group_id } => {
                let list = ctx.client.pdf_list(group_id).await?;
                println!("{}:", list.group_name);
                for pdf in &list.pdf_list {
                    println!(
                        "  [{}] {} by {} ({})",
                        pdf.id, pdf.title, pdf.uploader.nickname, pdf.created_at
                    );
                }
            }
        }
        Ok(())
    }
}

impl QuizCommands {
    async fn execute(self, ctx: &Context) -> Result<()> {
        match self {
            QuizCommands::Create {
                pdf_id,
                difficulty,
                types,
                count,
            } => {
                let quiz = ctx
                    .client
                    .create_quiz(&CreateQuizRequest {
                        pdf_id,
                        difficulty,
                        question_types: types,
                        total_questions: count,
                    })
                    .await?;
                println!(
                    "Created quiz {} (round {}), Q&A board {}",
                    quiz.id, quiz.round, quiz.qa_board.board_id
                );
            }
            QuizCommands::Start { quiz_id } => {
                let started = ctx.client.start_quiz(quiz_id).await?;
                ctx.answers.remember_result(quiz_id, started.quiz_result_id);
                println!("Started attempt {}", started.quiz_result_id);
            }
            QuizCommands::Show { quiz_id } => {
                let detail = ctx.client.quiz_detail(quiz_id).await?;
                let drafts = ctx.answers.load(quiz_id);
                println!("{} ({} questions)", detail.quiz.title, detail.quiz.total_questions);
                for question in &detail.questions {
                    let draft = drafts
                        .get(&question.id)
                        .and_then(|answer| answer.value.as_deref())
                        .unwrap_or("-");
                    println!(
                        "  {}. [{}] {} ({}) answer: {draft}",
                        question.question_number,
                        question.id,
                        question.question_text,
                        question.question_type
                    );
                    for option in &question.options {
                        println!("       - {}", option.option_text);
                    }
                }
            }
            QuizCommands::Answer {
                quiz_id,
                question_id,
                value,
            } => {
                let detail = ctx.client.quiz_detail(quiz_id).await?;
                let Some(question) = detail.questions.iter().find(|q| q.id == question_id) else {
                    bail!("quiz {quiz_id} has no question {question_id}");
                };
                ctx.answers.record(
                    quiz_id,
                    CachedAnswer {
                        question_id,
                        question_type: question.question_type.clone(),
                        value: Some(value),
                    },
                );
                println!("Recorded answer for question {}", question.question_number);
            }
            QuizCommands::Submit { quiz_id } => {
                let answers: Vec<SubmittedAnswer> = ctx
                    .answers
                    .load(quiz_id)
                    .into_values()
                    .map(|answer| SubmittedAnswer {
                        question_id: answer.question_id,
                        question_type: answer.question_type,
                        user_answer: answer.value.unwrap_or_default(),
                    })
                    .collect();
                if answers.is_empty() {
                    bail!("no answers recorded for quiz {quiz_id}; use `qroom quiz answer` first");
                }

                let submitted = ctx
                    .client
                    .submit_quiz(&SubmitQuizRequest {
                        quiz_id,
                        quiz_result_id: ctx.answers.last_result(quiz_id),
                        answers,
                    })
                    .await?;

                let result = submitted.result;
                ctx.answers.remember_result(quiz_id, result.quiz_result_id);
                ctx.answers.clear(quiz_id);
                println!(
                    "{}/{} correct ({}%), result id {}",
                    result.correct_count, result.total_questions, result.score, result.quiz_result_id
                );
            }
            QuizCommands::Result { quiz_result_id } => {
                let result = ctx.client.quiz_result(quiz_result_id).await?;
                let summary = &result.quiz_result;
                println!(
                    "{}: {}/{} correct ({}%)",
                    summary.quiz_title.as_deref().unwrap_or("quiz"),
                    summary.correct_count,
                    summary.total_questions,
                    summary.score
                );
                for answer in &result.answers {
                    let mark = if answer.is_correct { "O" } else { "X" };
                    println!(
                        "  {mark} {}. {} (yours: {}, correct: {})",
                        answer.question_number,
                        answer.question_text,
                        answer.user_answer.as_deref().unwrap_or("-"),
                        answer.correct_answer
                    );
                }
            }
        }
        Ok(())
    }
}

impl QaCommands {
    async fn execute(self, ctx: &Context) -> Result<()> {
        match self {
            QaCommands::Room { quiz_id } => {
                let room = ctx.client.qa_room(quiz_id).await?;
                print_json(&room)?;
            }
            QaCommands::Post {
                board_id,
                content,
                anonymous,
            } => {
                let created = ctx
                    .client
                    .create_qa_post(&CreateQaPostRequest {
                        board_id,
                        content,
                        is_anonymous: anonymous,
                    })
                    .await?;
                match created.get("id").and_then(Value::as_i64) {
                    Some(id) => println!("Posted question {id}"),
                    None => println!("Posted question"),
                }
            }
        }
        Ok(())
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
