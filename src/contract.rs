// DappLottery contract ABI: call encoding, return decoding and the
// reshaping of raw contract records into display records.

use ethabi::ethereum_types::U256;
use ethabi::{Address, ParamType, Token};

use crate::error::ClientError;
use crate::format::format_date;
use crate::models::{Lottery, LotteryResult, Participant};
use crate::units::from_wei;

/// LotteryStruct as stored by the contract
#[derive(Debug, Clone, PartialEq)]
pub struct RawLottery {
    pub id: U256,
    pub title: String,
    pub description: String,
    pub image: String,
    pub prize: U256,
    pub ticket_price: U256,
    pub participants: U256,
    pub winners: U256,
    pub drawn: bool,
    pub owner: Address,
    /// Seconds since the epoch
    pub created_at: U256,
    /// Milliseconds since the epoch
    pub expires_at: U256,
}

/// ParticipantStruct as stored by the contract
#[derive(Debug, Clone, PartialEq)]
pub struct RawParticipant {
    pub account: Address,
    pub lottery_number: String,
    pub paid: bool,
}

/// LotteryResultStruct as stored by the contract
#[derive(Debug, Clone, PartialEq)]
pub struct RawLotteryResult {
    pub id: U256,
    pub completed: bool,
    pub paid_out: bool,
    /// Seconds since the epoch
    pub timestamp: U256,
    pub share_per_winner: U256,
    pub winners: Vec<RawParticipant>,
}

pub fn lottery_params() -> Vec<ParamType> {
    vec![
        ParamType::Uint(256),
        ParamType::String,
        ParamType::String,
        ParamType::String,
        ParamType::Uint(256),
        ParamType::Uint(256),
        ParamType::Uint(256),
        ParamType::Uint(256),
        ParamType::Bool,
        ParamType::Address,
        ParamType::Uint(256),
        ParamType::Uint(256),
    ]
}

pub fn participant_params() -> Vec<ParamType> {
    vec![ParamType::Address, ParamType::String, ParamType::Bool]
}

pub fn lottery_result_params() -> Vec<ParamType> {
    vec![
        ParamType::Uint(256),
        ParamType::Bool,
        ParamType::Bool,
        ParamType::Uint(256),
        ParamType::Uint(256),
        ParamType::Array(Box::new(ParamType::Tuple(participant_params()))),
    ]
}

/// Contract methods called by the client, with their argument types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    GetLotteries,
    GetLottery,
    GetLotteryLuckyNumbers,
    GetLotteryParticipants,
    GetLotteryResult,
    CreateLottery,
    ImportLuckyNumbers,
    BuyTicket,
    RandomlySelectWinners,
}

impl Method {
    pub fn name(&self) -> &'static str {
        match self {
            Method::GetLotteries => "getLotteries",
            Method::GetLottery => "getLottery",
            Method::GetLotteryLuckyNumbers => "getLotteryLuckyNumbers",
            Method::GetLotteryParticipants => "getLotteryParticipants",
            Method::GetLotteryResult => "getLotteryResult",
            Method::CreateLottery => "createLottery",
            Method::ImportLuckyNumbers => "importLuckyNumbers",
            Method::BuyTicket => "buyTicket",
            Method::RandomlySelectWinners => "randomlySelectWinners",
        }
    }

    pub fn inputs(&self) -> Vec<ParamType> {
        match self {
            Method::GetLotteries => vec![],
            Method::GetLottery
            | Method::GetLotteryLuckyNumbers
            | Method::GetLotteryParticipants
            | Method::GetLotteryResult => vec![ParamType::Uint(256)],
            Method::CreateLottery => vec![
                ParamType::String,
                ParamType::String,
                ParamType::String,
                ParamType::Uint(256),
                ParamType::Uint(256),
                ParamType::Uint(256),
            ],
            Method::ImportLuckyNumbers => vec![
                ParamType::Uint(256),
                ParamType::Array(Box::new(ParamType::String)),
            ],
            Method::BuyTicket | Method::RandomlySelectWinners => {
                vec![ParamType::Uint(256), ParamType::Uint(256)]
            }
        }
    }

    pub fn selector(&self) -> [u8; 4] {
        ethabi::short_signature(self.name(), &self.inputs())
    }

    /// Selector followed by the ABI-encoded arguments.
    pub fn encode(&self, tokens: &[Token]) -> Vec<u8> {
        let mut data = self.selector().to_vec();
        data.extend(ethabi::encode(tokens));
        data
    }
}

fn uint(token: Token) -> Result<U256, ClientError> {
    token
        .into_uint()
        .ok_or_else(|| ClientError::decode("expected uint"))
}

fn string(token: Token) -> Result<String, ClientError> {
    token
        .into_string()
        .ok_or_else(|| ClientError::decode("expected string"))
}

fn boolean(token: Token) -> Result<bool, ClientError> {
    token
        .into_bool()
        .ok_or_else(|| ClientError::decode("expected bool"))
}

fn address(token: Token) -> Result<Address, ClientError> {
    token
        .into_address()
        .ok_or_else(|| ClientError::decode("expected address"))
}

fn tuple(token: Token, len: usize) -> Result<std::vec::IntoIter<Token>, ClientError> {
    match token {
        Token::Tuple(fields) if fields.len() == len => Ok(fields.into_iter()),
        other => Err(ClientError::decode(format!(
            "expected tuple of {} fields, got {:?}",
            len, other
        ))),
    }
}

fn array(token: Token) -> Result<Vec<Token>, ClientError> {
    token
        .into_array()
        .ok_or_else(|| ClientError::decode("expected array"))
}

fn next(fields: &mut std::vec::IntoIter<Token>) -> Result<Token, ClientError> {
    fields
        .next()
        .ok_or_else(|| ClientError::decode("missing tuple field"))
}

impl RawLottery {
    pub fn from_token(token: Token) -> Result<Self, ClientError> {
        let mut f = tuple(token, 12)?;
        Ok(RawLottery {
            id: uint(next(&mut f)?)?,
            title: string(next(&mut f)?)?,
            description: string(next(&mut f)?)?,
            image: string(next(&mut f)?)?,
            prize: uint(next(&mut f)?)?,
            ticket_price: uint(next(&mut f)?)?,
            participants: uint(next(&mut f)?)?,
            winners: uint(next(&mut f)?)?,
            drawn: boolean(next(&mut f)?)?,
            owner: address(next(&mut f)?)?,
            created_at: uint(next(&mut f)?)?,
            expires_at: uint(next(&mut f)?)?,
        })
    }

    pub fn into_token(self) -> Token {
        Token::Tuple(vec![
            Token::Uint(self.id),
            Token::String(self.title),
            Token::String(self.description),
            Token::String(self.image),
            Token::Uint(self.prize),
            Token::Uint(self.ticket_price),
            Token::Uint(self.participants),
            Token::Uint(self.winners),
            Token::Bool(self.drawn),
            Token::Address(self.owner),
            Token::Uint(self.created_at),
            Token::Uint(self.expires_at),
        ])
    }
}

impl RawParticipant {
    pub fn from_token(token: Token) -> Result<Self, ClientError> {
        let mut f = tuple(token, 3)?;
        Ok(RawParticipant {
            account: address(next(&mut f)?)?,
            lottery_number: string(next(&mut f)?)?,
            paid: boolean(next(&mut f)?)?,
        })
    }

    pub fn into_token(self) -> Token {
        Token::Tuple(vec![
            Token::Address(self.account),
            Token::String(self.lottery_number),
            Token::Bool(self.paid),
        ])
    }
}

impl RawLotteryResult {
    pub fn from_token(token: Token) -> Result<Self, ClientError> {
        let mut f = tuple(token, 6)?;
        Ok(RawLotteryResult {
            id: uint(next(&mut f)?)?,
            completed: boolean(next(&mut f)?)?,
            paid_out: boolean(next(&mut f)?)?,
            timestamp: uint(next(&mut f)?)?,
            share_per_winner: uint(next(&mut f)?)?,
            winners: array(next(&mut f)?)?
                .into_iter()
                .map(RawParticipant::from_token)
                .collect::<Result<_, _>>()?,
        })
    }

    pub fn into_token(self) -> Token {
        Token::Tuple(vec![
            Token::Uint(self.id),
            Token::Bool(self.completed),
            Token::Bool(self.paid_out),
            Token::Uint(self.timestamp),
            Token::Uint(self.share_per_winner),
            Token::Array(
                self.winners
                    .into_iter()
                    .map(RawParticipant::into_token)
                    .collect(),
            ),
        ])
    }
}

/// Decode the single return value of a contract call.
pub fn decode_output(param: ParamType, data: &[u8]) -> Result<Token, ClientError> {
    ethabi::decode(&[param], data)?
        .pop()
        .ok_or_else(|| ClientError::decode("empty return data"))
}

pub fn decode_lotteries(data: &[u8]) -> Result<Vec<RawLottery>, ClientError> {
    let token = decode_output(
        ParamType::Array(Box::new(ParamType::Tuple(lottery_params()))),
        data,
    )?;
    array(token)?.into_iter().map(RawLottery::from_token).collect()
}

pub fn decode_lottery(data: &[u8]) -> Result<RawLottery, ClientError> {
    RawLottery::from_token(decode_output(ParamType::Tuple(lottery_params()), data)?)
}

pub fn decode_lucky_numbers(data: &[u8]) -> Result<Vec<String>, ClientError> {
    let token = decode_output(ParamType::Array(Box::new(ParamType::String)), data)?;
    array(token)?.into_iter().map(string).collect()
}

pub fn decode_participants(data: &[u8]) -> Result<Vec<RawParticipant>, ClientError> {
    let token = decode_output(
        ParamType::Array(Box::new(ParamType::Tuple(participant_params()))),
        data,
    )?;
    array(token)?
        .into_iter()
        .map(RawParticipant::from_token)
        .collect()
}

pub fn decode_lottery_result(data: &[u8]) -> Result<RawLotteryResult, ClientError> {
    RawLotteryResult::from_token(decode_output(
        ParamType::Tuple(lottery_result_params()),
        data,
    )?)
}

/// Lowercase 0x-prefixed hex form of an address.
pub fn format_address(address: &Address) -> String {
    format!("0x{}", hex::encode(address.as_bytes()))
}

/// Parse a 0x-prefixed (or bare) 20-byte hex address.
pub fn parse_address(s: &str) -> Result<Address, ClientError> {
    let bytes = hex::decode(s.trim_start_matches("0x"))
        .map_err(|e| ClientError::decode(format!("invalid address {}: {}", s, e)))?;
    if bytes.len() != 20 {
        return Err(ClientError::decode(format!("invalid address length: {}", s)));
    }
    Ok(Address::from_slice(&bytes))
}

/// Saturating conversion for counters and timestamps.
fn to_u64(value: U256) -> u64 {
    if value > U256::from(u64::MAX) {
        u64::MAX
    } else {
        value.low_u64()
    }
}

pub fn structure_lottery(raw: RawLottery) -> Lottery {
    let created_ms = to_u64(raw.created_at).saturating_mul(1000);
    let expires_at = to_u64(raw.expires_at);
    Lottery {
        id: to_u64(raw.id),
        title: raw.title,
        description: raw.description,
        image: raw.image,
        owner: format_address(&raw.owner),
        prize: from_wei(raw.prize),
        ticket_price: from_wei(raw.ticket_price),
        created_at: format_date(created_ms as i64),
        draws_at: format_date(expires_at as i64),
        expires_at,
        winners: to_u64(raw.winners),
        participants: to_u64(raw.participants),
        drawn: raw.drawn,
    }
}

/// Order-preserving reshaping of contract records. Never filters, reorders
/// or deduplicates.
pub fn structure_lotteries(raws: Vec<RawLottery>) -> Vec<Lottery> {
    raws.into_iter().map(structure_lottery).collect()
}

pub fn structure_participants(raws: Vec<RawParticipant>) -> Vec<Participant> {
    raws.into_iter()
        .map(|raw| Participant {
            account: format_address(&raw.account),
            lottery_number: raw.lottery_number,
            paid: raw.paid,
        })
        .collect()
}

pub fn structure_lottery_result(raw: RawLotteryResult) -> LotteryResult {
    LotteryResult {
        id: to_u64(raw.id),
        completed: raw.completed,
        paid_out: raw.paid_out,
        timestamp: format_date(to_u64(raw.timestamp).saturating_mul(1000) as i64),
        share_per_winner: from_wei(raw.share_per_winner),
        winners: structure_participants(raw.winners),
    }
}
