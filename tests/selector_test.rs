use rand::SeedableRng;
use rand::rngs::StdRng;
use retort::catalog::Catalog;
use retort::memory::ConversationMemory;
use retort::resolver::MatchResolver;
use retort::selector::{ReplySelector, pick_fresh};
use retort::types::{DispatchOutcome, InboundEvent, OutcomeKind};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

const BOT_ID: i64 = 777;

fn catalog() -> Catalog {
    Catalog::from_json(
        r#"{
          "respostas_por_palavra_chave": {
            "quatro": ["a", "b", "c", "d"],
            "um": ["so"],
            "midia": [{"texto": "olha isso", "sticker": "STK"}]
          },
          "respostas_por_reply": {
            "zoomer": [{"texto": "confirmado, {user_input}"}, {"texto": "{user_input}? sim"}]
          },
          "resposta_generica_para_reply": ["x", "y"]
        }"#,
    )
    .unwrap()
}

async fn select(
    catalog: &Catalog,
    memory: &ConversationMemory,
    event: &InboundEvent,
    rng: &mut StdRng,
) -> Option<DispatchOutcome> {
    let resolution = MatchResolver::new(catalog)
        .resolve(event, Some(BOT_ID))
        .unwrap()?;
    ReplySelector::new(memory)
        .select(event.conversation_id, &resolution, rng)
        .await
}

#[tokio::test]
async fn no_pick_repeats_any_of_the_previous_n_minus_one() {
    let catalog = catalog();
    let memory = ConversationMemory::new();
    let mut rng = StdRng::seed_from_u64(11);
    let event = InboundEvent::text(1, "quatro");

    let mut picks = Vec::new();
    for _ in 0..40 {
        let outcome = select(&catalog, &memory, &event, &mut rng).await.unwrap();
        picks.push(outcome.payload);
    }

    for (i, pick) in picks.iter().enumerate() {
        let window = &picks[i.saturating_sub(3)..i];
        assert!(!window.contains(pick), "pick {i} ({pick}) repeats {window:?}");
    }

    let first_cycle: HashSet<&String> = picks[..4].iter().collect();
    assert_eq!(first_cycle.len(), 4);
}

#[tokio::test]
async fn history_is_bounded_to_one_less_than_the_candidates() {
    let catalog = catalog();
    let memory = ConversationMemory::new();
    let mut rng = StdRng::seed_from_u64(5);
    let event = InboundEvent::text(9, "quatro");

    for expected_len in [1, 2, 3, 3, 3] {
        select(&catalog, &memory, &event, &mut rng).await.unwrap();
        assert_eq!(memory.recent(9, "quatro").await.len(), expected_len);
    }
}

#[tokio::test]
async fn single_candidate_rule_always_answers() {
    let catalog = catalog();
    let memory = ConversationMemory::new();
    let mut rng = StdRng::seed_from_u64(5);
    let event = InboundEvent::text(3, "um");

    for _ in 0..3 {
        let outcome = select(&catalog, &memory, &event, &mut rng).await.unwrap();
        assert_eq!(outcome, DispatchOutcome::text("so"));
    }
    assert!(memory.recent(3, "um").await.is_empty());
}

#[tokio::test]
async fn conversations_keep_separate_histories() {
    let catalog = catalog();
    let memory = ConversationMemory::new();
    let mut rng = StdRng::seed_from_u64(8);

    select(&catalog, &memory, &InboundEvent::text(1, "quatro"), &mut rng).await;
    select(&catalog, &memory, &InboundEvent::text(1, "quatro"), &mut rng).await;
    select(&catalog, &memory, &InboundEvent::text(2, "quatro"), &mut rng).await;

    assert_eq!(memory.recent(1, "quatro").await.len(), 2);
    assert_eq!(memory.recent(2, "quatro").await.len(), 1);
    assert_eq!(memory.conversation_count().await, 2);
}

#[tokio::test]
async fn reply_paths_do_not_touch_memory() {
    let catalog = catalog();
    let memory = ConversationMemory::new();
    let mut rng = StdRng::seed_from_u64(2);

    let triggered = InboundEvent::text(1, "eu sei").replying_to(BOT_ID, "zoomer momento");
    let generic = InboundEvent::text(1, "hm").replying_to(BOT_ID, "bom dia");
    for _ in 0..5 {
        let outcome = select(&catalog, &memory, &triggered, &mut rng).await.unwrap();
        assert!(
            outcome.payload == "confirmado, eu sei" || outcome.payload == "eu sei? sim",
            "unexpected {outcome:?}"
        );
        let outcome = select(&catalog, &memory, &generic, &mut rng).await.unwrap();
        assert!(outcome.payload == "x" || outcome.payload == "y");
    }

    assert_eq!(memory.conversation_count().await, 0);
}

#[tokio::test]
async fn media_candidate_dispatches_as_media_with_caption() {
    let catalog = catalog();
    let memory = ConversationMemory::new();
    let mut rng = StdRng::seed_from_u64(1);

    let outcome = select(&catalog, &memory, &InboundEvent::text(1, "MIDIA"), &mut rng)
        .await
        .unwrap();
    assert_eq!(outcome.kind, OutcomeKind::Sticker);
    assert_eq!(outcome.payload, "STK");
    assert_eq!(outcome.caption.as_deref(), Some("olha isso"));
}

#[tokio::test]
async fn concurrent_picks_in_one_conversation_never_interleave() {
    let memory = Arc::new(ConversationMemory::new());
    let order = Arc::new(Mutex::new(Vec::new()));

    let mut tasks = Vec::new();
    for seed in 0..64u64 {
        let memory = Arc::clone(&memory);
        let order = Arc::clone(&order);
        tasks.push(tokio::spawn(async move {
            let mut rng = StdRng::seed_from_u64(seed);
            memory
                .with_rule(1, "par", |recent| {
                    let pick = pick_fresh("par", recent, 2, &mut rng).unwrap();
                    order.lock().unwrap().push(pick);
                })
                .await;
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    // With two candidates every pick must differ from the one before it.
    let order = order.lock().unwrap();
    assert_eq!(order.len(), 64);
    assert!(order.windows(2).all(|w| w[0] != w[1]), "{order:?}");
}

#[test]
fn unknown_conversation_has_no_history() {
    let memory = ConversationMemory::new();
    assert!(tokio_test::block_on(memory.recent(404, "pc")).is_empty());
    assert_eq!(tokio_test::block_on(memory.conversation_count()), 0);
}
