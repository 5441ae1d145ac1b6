// Fake lottery data for running the pages without a contract

use chrono::Utc;
use ethabi::ethereum_types::U256;
use ethabi::Address;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::contract::{structure_lottery, structure_participants, RawLottery, RawParticipant};
use crate::models::{Lottery, Participant};

const WORDS: &[&str] = &[
    "golden", "lucky", "weekly", "mega", "super", "crypto", "moon", "jackpot", "fortune",
    "diamond", "silver", "daily", "grand", "royal", "star",
];

const SENTENCES: &[&str] = &[
    "Pick your lucky number before the draw closes.",
    "Winners share the prize pool equally.",
    "Tickets are paid in ether and settled on-chain.",
    "The draw happens once the lottery expires.",
    "Every ticket holds a single lucky number.",
];

const LUCKY_NUMBER_LEN: usize = 6;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

fn words<R: Rng>(rng: &mut R, count: usize) -> String {
    (0..count)
        .filter_map(|_| WORDS.choose(rng).copied())
        .collect::<Vec<_>>()
        .join(" ")
}

fn paragraph<R: Rng>(rng: &mut R) -> String {
    let count = rng.gen_range(2..=4);
    SENTENCES
        .choose_multiple(rng, count)
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}

fn random_address<R: Rng>(rng: &mut R) -> Address {
    Address::from(rng.gen::<[u8; 20]>())
}

fn lucky_number<R: Rng>(rng: &mut R) -> String {
    (0..LUCKY_NUMBER_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect()
}

fn raw_lottery<R: Rng>(rng: &mut R, id: u64) -> RawLottery {
    let now_ms = Utc::now().timestamp_millis().max(0) as u64;
    let day_ms = 24 * 60 * 60 * 1000;
    let created_ms = now_ms - rng.gen_range(0..30) * day_ms;
    let expires_ms = now_ms + rng.gen_range(1..30) * day_ms;
    // prize in whole ether, ticket price between 0.01 and 0.05 ether
    let prize = U256::exp10(18) * U256::from(rng.gen_range(10u64..=1000));
    let ticket_price = U256::exp10(16) * U256::from(rng.gen_range(1u64..=5));

    RawLottery {
        id: U256::from(id),
        title: words(rng, 5),
        description: paragraph(rng),
        image: format!("https://picsum.photos/seed/lottery{}/640/480", id),
        prize,
        ticket_price,
        participants: U256::from(rng.gen_range(0u64..100)),
        winners: U256::zero(),
        drawn: false,
        owner: random_address(rng),
        created_at: U256::from(created_ms / 1000),
        expires_at: U256::from(expires_ms),
    }
}

/// One fake lottery per id in 1..=count.
pub fn generate_lotteries(count: usize) -> Vec<Lottery> {
    let mut rng = rand::thread_rng();
    (1..=count as u64)
        .map(|id| structure_lottery(raw_lottery(&mut rng, id)))
        .collect()
}

pub fn generate_lottery(id: u64) -> Lottery {
    structure_lottery(raw_lottery(&mut rand::thread_rng(), id))
}

pub fn generate_lottery_participants(count: usize) -> Vec<Participant> {
    let mut rng = rand::thread_rng();
    let raws = (0..count)
        .map(|_| RawParticipant {
            account: random_address(&mut rng),
            lottery_number: lucky_number(&mut rng),
            paid: false,
        })
        .collect();
    structure_participants(raws)
}

pub fn get_purchased_numbers(count: usize) -> Vec<String> {
    generate_lucky_numbers(count)
}

/// Random 6-character base-36 codes.
pub fn generate_lucky_numbers(count: usize) -> Vec<String> {
    let mut rng = rand::thread_rng();
    (0..count).map(|_| lucky_number(&mut rng)).collect()
}
