//! Crowdfunding escrow: campaigns raise SOL toward a goal; on success the creator
//! withdraws minus a protocol fee, on expiry supporters reclaim their pledges.
//! Supporters of a funded campaign claim numbered reward editions from escrow.

use anchor_lang::prelude::*;
use anchor_lang::system_program::{self, Transfer};
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface, TransferChecked};
use mpl_token_metadata::{accounts::Metadata, ID as MPL_TOKEN_METADATA_ID};

// Anchor programs must be deployed at their declared ID.
// We support devnet vs localnet IDs via a build-time feature so CI/local tests keep working.
// Localnet first so `anchor keys sync` updates it to match target/deploy keypairs; build (no devnet) then uses keypair ID.
#[cfg(not(feature = "devnet"))]
declare_id!("FimYszAo6d4WboiABnVFC4is6vebkEzbqmNVL7gkwg3H");
#[cfg(feature = "devnet")]
declare_id!("8o6xeX4NsYXwbwJCdeG7g4dbrQ1V98JtS9qwFWgWfYay");

/// Platform fee: 25/1000 = 2.5% of the raised amount, truncating division.
/// The creator receives the remainder, so fee + principal always reconstruct
/// the withdrawn total.
pub const FEE_NUMERATOR: u64 = 25;
pub const FEE_DENOMINATOR: u64 = 1000;

/// Funding window: campaigns past creation + this duration without reaching
/// their goal are terminal-failed (evaluated lazily at instruction time).
pub const CAMPAIGN_DURATION_SECS: i64 = 30 * 24 * 60 * 60;

/// Numbered reward editions issued per campaign.
pub const MAX_EDITIONS: u16 = 5;

/// Max lengths for campaign text fields (name/symbol/uri aligned with Metaplex
/// Token Metadata). project_name is also a PDA seed, so it must fit one seed.
pub const MAX_PROJECT_NAME_LEN: usize = 32;
pub const MAX_DESCRIPTION_LEN: usize = 200;
pub const MAX_NFT_NAME_LEN: usize = 32;
pub const MAX_NFT_SYMBOL_LEN: usize = 10;
pub const MAX_NFT_URI_LEN: usize = 200;

/// Upgradeable loader: Program variant.
const UPGRADEABLE_LOADER_PROGRAM_STATE: u8 = 2;
/// Upgradeable loader: ProgramData variant.
const UPGRADEABLE_LOADER_PROGRAM_DATA_STATE: u8 = 3;
/// Program account min length: 4-byte discriminant + 32-byte programdata address (spec).
const MIN_PROGRAM_ACCOUNT_LEN: usize = 36;
/// ProgramData metadata min length: 4-byte + 8 + 1 + 32 (spec).
const MIN_PROGRAMDATA_METADATA_LEN: usize = 45;

#[error_code]
pub enum CrowdfundError {
    #[msg("Signer is not authorized for this operation")]
    Unauthorized,
    #[msg("Funding goal must be greater than zero")]
    InvalidFundingGoal,
    #[msg("Amount must be greater than zero")]
    InvalidAmount,
    #[msg("Project name is empty")]
    ProjectNameEmpty,
    #[msg("Project name too long")]
    ProjectNameTooLong,
    #[msg("Description too long")]
    DescriptionTooLong,
    #[msg("NFT name too long")]
    NftNameTooLong,
    #[msg("NFT symbol too long")]
    NftSymbolTooLong,
    #[msg("NFT uri too long")]
    NftUriTooLong,
    #[msg("Reward mint does not match campaign or is not a zero-decimal mint")]
    InvalidRewardMint,
    #[msg("Metadata account is not the canonical metadata PDA of the reward mint")]
    InvalidMetadataAccount,
    #[msg("Campaign already reached its funding goal")]
    CampaignAlreadyFunded,
    #[msg("Campaign funding window has ended")]
    CampaignEnded,
    #[msg("Campaign funding window has not ended yet")]
    CampaignNotEnded,
    #[msg("Campaign succeeded; refunds are not available")]
    CampaignSucceeded,
    #[msg("Campaign has not reached its funding goal")]
    CampaignNotFunded,
    #[msg("Funds already withdrawn")]
    AlreadyWithdrawn,
    #[msg("Already claimed")]
    AlreadyClaimed,
    #[msg("Reward NFT is already in escrow")]
    NftAlreadyInEscrow,
    #[msg("Reward NFT has not been deposited into escrow")]
    NftNotInEscrow,
    #[msg("All reward editions have been issued")]
    EditionsExhausted,
    #[msg("Insufficient funds")]
    InsufficientFunds,
    #[msg("Arithmetic overflow")]
    Overflow,
    #[msg("Only program upgrade authority can modify config")]
    NotUpgradeAuthority,
}

/// Campaign lifecycle, derived in one place from the one-way `is_funded`
/// flag and the funding deadline. `Funded` and `Failed` are terminal and
/// mutually exclusive.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CampaignLifecycle {
    Active,
    Funded,
    Failed,
}

/// Truncating fee split: (fee, principal). principal = amount - fee, so the
/// two parts always sum back to `amount`.
pub fn fee_split(amount: u64) -> Result<(u64, u64)> {
    let fee = (amount as u128)
        .checked_mul(FEE_NUMERATOR as u128)
        .ok_or(CrowdfundError::Overflow)?
        .checked_div(FEE_DENOMINATOR as u128)
        .ok_or(CrowdfundError::Overflow)? as u64;
    let principal = amount.checked_sub(fee).ok_or(CrowdfundError::Overflow)?;
    Ok((fee, principal))
}

/// Next 1-based edition number, or EditionsExhausted once the cap is reached.
pub fn next_edition(editions_minted: u16, max_editions: u16) -> Result<u16> {
    require!(
        editions_minted < max_editions,
        CrowdfundError::EditionsExhausted
    );
    editions_minted
        .checked_add(1)
        .ok_or(error!(CrowdfundError::Overflow))
}

/// Bounds checks for all campaign text fields. project_name doubles as a PDA
/// seed, so its bound also keeps the seed within the runtime's seed limit.
pub fn validate_campaign_text(
    project_name: &str,
    description: &str,
    nft_name: &str,
    nft_symbol: &str,
    nft_uri: &str,
) -> Result<()> {
    require!(!project_name.is_empty(), CrowdfundError::ProjectNameEmpty);
    require!(
        project_name.len() <= MAX_PROJECT_NAME_LEN,
        CrowdfundError::ProjectNameTooLong
    );
    require!(
        description.len() <= MAX_DESCRIPTION_LEN,
        CrowdfundError::DescriptionTooLong
    );
    require!(nft_name.len() <= MAX_NFT_NAME_LEN, CrowdfundError::NftNameTooLong);
    require!(
        nft_symbol.len() <= MAX_NFT_SYMBOL_LEN,
        CrowdfundError::NftSymbolTooLong
    );
    require!(nft_uri.len() <= MAX_NFT_URI_LEN, CrowdfundError::NftUriTooLong);
    Ok(())
}

/// Validates that the signer is the program's upgrade authority by reading upgradeable loader
/// state (4-byte bincode layout).
fn require_upgrade_authority(
    program_id: &Pubkey,
    program_account_key: &Pubkey,
    program_account_data: &[u8],
    program_data_account_key: &Pubkey,
    program_data_account_data: &[u8],
    authority_key: &Pubkey,
) -> Result<()> {
    require!(
        program_account_key == program_id,
        CrowdfundError::NotUpgradeAuthority
    );

    // Program account: 4-byte discriminant + 32-byte programdata address.
    require!(
        program_account_data.len() >= MIN_PROGRAM_ACCOUNT_LEN
            && u32::from_le_bytes(program_account_data[0..4].try_into().unwrap())
                == UPGRADEABLE_LOADER_PROGRAM_STATE as u32,
        CrowdfundError::NotUpgradeAuthority
    );
    let programdata_address =
        Pubkey::new_from_array(program_account_data[4..36].try_into().unwrap());
    require!(
        program_data_account_key == &programdata_address,
        CrowdfundError::NotUpgradeAuthority
    );

    // ProgramData account: 4-byte discriminant, slot (8), Option (1), Pubkey (32).
    require!(
        program_data_account_data.len() >= MIN_PROGRAMDATA_METADATA_LEN
            && u32::from_le_bytes(program_data_account_data[0..4].try_into().unwrap())
                == UPGRADEABLE_LOADER_PROGRAM_DATA_STATE as u32,
        CrowdfundError::NotUpgradeAuthority
    );
    let option_byte = program_data_account_data[12];
    require!(option_byte == 1, CrowdfundError::NotUpgradeAuthority); // Option::Some
    let upgrade_authority =
        Pubkey::new_from_array(program_data_account_data[13..45].try_into().unwrap());
    require!(
        upgrade_authority == *authority_key,
        CrowdfundError::NotUpgradeAuthority
    );
    Ok(())
}

#[program]
pub mod crowdfund_escrow {
    use super::*;

    /// One-time init: store the platform admin allowed to drain the treasury.
    /// Only the program upgrade authority can call this.
    pub fn initialize_config(ctx: Context<InitializeConfig>, admin: Pubkey) -> Result<()> {
        let program_account = ctx.accounts.program_account.try_borrow_data()?;
        let program_data_account = ctx.accounts.program_data_account.try_borrow_data()?;
        require_upgrade_authority(
            ctx.program_id,
            &ctx.accounts.program_account.key(),
            &program_account,
            &ctx.accounts.program_data_account.key(),
            &program_data_account,
            &ctx.accounts.authority.key(),
        )?;

        let config = &mut ctx.accounts.config;
        config.admin = admin;
        msg!("Config initialized: admin = {}", config.admin);
        Ok(())
    }

    /// Update the stored platform admin (key rotation). Only the program upgrade authority can call this.
    pub fn update_config(ctx: Context<UpdateConfig>, admin: Pubkey) -> Result<()> {
        let program_account = ctx.accounts.program_account.try_borrow_data()?;
        let program_data_account = ctx.accounts.program_data_account.try_borrow_data()?;
        require_upgrade_authority(
            ctx.program_id,
            &ctx.accounts.program_account.key(),
            &program_account,
            &ctx.accounts.program_data_account.key(),
            &program_data_account,
            &ctx.accounts.authority.key(),
        )?;

        let config = &mut ctx.accounts.config;
        config.admin = admin;
        msg!("Config updated: admin = {}", config.admin);
        Ok(())
    }

    /// Register a campaign. Does not move the reward NFT; custody transfer
    /// is a separate, later instruction.
    pub fn initialize_campaign(
        ctx: Context<InitializeCampaign>,
        project_name: String,
        description: String,
        funding_goal: u64,
        nft_name: String,
        nft_symbol: String,
        nft_uri: String,
    ) -> Result<()> {
        validate_campaign_text(&project_name, &description, &nft_name, &nft_symbol, &nft_uri)?;
        require!(funding_goal > 0, CrowdfundError::InvalidFundingGoal);
        require!(
            ctx.accounts.nft_mint.decimals == 0,
            CrowdfundError::InvalidRewardMint
        );

        let clock = Clock::get()?;
        let end_timestamp = clock
            .unix_timestamp
            .checked_add(CAMPAIGN_DURATION_SECS)
            .ok_or(CrowdfundError::Overflow)?;

        let campaign = &mut ctx.accounts.campaign;
        campaign.creator = ctx.accounts.creator.key();
        campaign.project_name = project_name;
        campaign.description = description;
        campaign.nft_name = nft_name;
        campaign.nft_symbol = nft_symbol;
        campaign.nft_uri = nft_uri;
        campaign.funding_goal = funding_goal;
        campaign.raised_amount = 0;
        campaign.is_funded = false;
        campaign.funds_withdrawn = false;
        campaign.nft_mint = ctx.accounts.nft_mint.key();
        campaign.nft_in_escrow = false;
        campaign.max_editions = MAX_EDITIONS;
        campaign.editions_minted = 0;
        campaign.end_timestamp = end_timestamp;
        campaign.bump = ctx.bumps.campaign;

        msg!(
            "Campaign created: {} by {} goal {} ends {}",
            campaign.project_name,
            campaign.creator,
            campaign.funding_goal,
            campaign.end_timestamp
        );
        Ok(())
    }

    /// Pledge lamports to an active campaign. Repeat pledges from the same
    /// supporter accumulate into their existing funding record.
    pub fn fund_campaign(ctx: Context<FundCampaign>, amount: u64) -> Result<()> {
        require!(amount > 0, CrowdfundError::InvalidAmount);

        let clock = Clock::get()?;
        match ctx.accounts.campaign.lifecycle(clock.unix_timestamp) {
            CampaignLifecycle::Funded => {
                return Err(CrowdfundError::CampaignAlreadyFunded.into())
            }
            CampaignLifecycle::Failed => return Err(CrowdfundError::CampaignEnded.into()),
            CampaignLifecycle::Active => {}
        }

        system_program::transfer(
            CpiContext::new(
                ctx.accounts.system_program.to_account_info(),
                Transfer {
                    from: ctx.accounts.supporter.to_account_info(),
                    to: ctx.accounts.campaign.to_account_info(),
                },
            ),
            amount,
        )?;

        let funding = &mut ctx.accounts.supporter_funding;
        let first_contribution = funding.amount == 0;
        if first_contribution {
            funding.campaign = ctx.accounts.campaign.key();
            funding.supporter = ctx.accounts.supporter.key();
            funding.is_claimed = false;
            funding.nft_minted = false;
            funding.bump = ctx.bumps.supporter_funding;
        }
        funding.amount = funding
            .amount
            .checked_add(amount)
            .ok_or(CrowdfundError::Overflow)?;

        let campaign = &mut ctx.accounts.campaign;
        campaign.raised_amount = campaign
            .raised_amount
            .checked_add(amount)
            .ok_or(CrowdfundError::Overflow)?;
        if campaign.raised_amount >= campaign.funding_goal {
            // One-way transition; never reset even though raised_amount later
            // drops to zero on withdrawal.
            campaign.is_funded = true;
        }

        msg!(
            "Funded campaign {} with {} lamports (raised {}/{}, funded: {})",
            campaign.key(),
            amount,
            campaign.raised_amount,
            campaign.funding_goal,
            campaign.is_funded
        );
        Ok(())
    }

    /// Creator payout after success: fee to the treasury, remainder to the
    /// creator, both in one transaction. One-shot; guarded by the
    /// funds_withdrawn flag, not just the drained balance.
    pub fn withdraw_funds(ctx: Context<WithdrawFunds>) -> Result<()> {
        let campaign = &ctx.accounts.campaign;
        require!(campaign.is_funded, CrowdfundError::CampaignNotFunded);
        require!(!campaign.funds_withdrawn, CrowdfundError::AlreadyWithdrawn);

        let raised = campaign.raised_amount;
        let (fee, principal) = fee_split(raised)?;

        // The campaign account carries data, so lamports move by direct debit
        // (the program owns it); contributed lamports sit on top of the
        // rent-exempt minimum, which never becomes disbursable.
        **ctx
            .accounts
            .campaign
            .to_account_info()
            .try_borrow_mut_lamports()? -= raised;
        **ctx
            .accounts
            .treasury
            .to_account_info()
            .try_borrow_mut_lamports()? += fee;
        **ctx
            .accounts
            .creator
            .to_account_info()
            .try_borrow_mut_lamports()? += principal;

        let campaign = &mut ctx.accounts.campaign;
        campaign.funds_withdrawn = true;
        campaign.raised_amount = 0;

        msg!(
            "Withdrawal: {} lamports to creator, {} fee to treasury (raised {})",
            principal,
            fee,
            raised
        );
        Ok(())
    }

    /// Supporter reclaims their pledge from a failed campaign.
    pub fn claim_refund(ctx: Context<ClaimRefund>) -> Result<()> {
        let clock = Clock::get()?;
        match ctx.accounts.campaign.lifecycle(clock.unix_timestamp) {
            CampaignLifecycle::Active => return Err(CrowdfundError::CampaignNotEnded.into()),
            CampaignLifecycle::Funded => {
                return Err(CrowdfundError::CampaignSucceeded.into())
            }
            CampaignLifecycle::Failed => {}
        }

        let funding = &ctx.accounts.supporter_funding;
        require!(!funding.is_claimed, CrowdfundError::AlreadyClaimed);
        let refund_amount = funding.amount;

        **ctx
            .accounts
            .campaign
            .to_account_info()
            .try_borrow_mut_lamports()? -= refund_amount;
        **ctx
            .accounts
            .supporter
            .to_account_info()
            .try_borrow_mut_lamports()? += refund_amount;

        let funding = &mut ctx.accounts.supporter_funding;
        funding.is_claimed = true;

        let campaign = &mut ctx.accounts.campaign;
        campaign.raised_amount = campaign.raised_amount.saturating_sub(refund_amount);

        msg!(
            "Refunded {} lamports to {}",
            refund_amount,
            ctx.accounts.supporter.key()
        );
        Ok(())
    }

    /// Creator deposits the reward units into the program-owned escrow token
    /// account; one unit per claimable edition. The passed metadata account
    /// must be the canonical metadata PDA of the reward mint (its content is
    /// never read here).
    pub fn transfer_nft_to_escrow(ctx: Context<TransferNftToEscrow>) -> Result<()> {
        let campaign = &ctx.accounts.campaign;
        require!(!campaign.nft_in_escrow, CrowdfundError::NftAlreadyInEscrow);

        let (expected_metadata, _) = Metadata::find_pda(&ctx.accounts.nft_mint.key());
        require!(
            ctx.accounts.nft_metadata.key() == expected_metadata,
            CrowdfundError::InvalidMetadataAccount
        );
        require!(
            *ctx.accounts.nft_metadata.owner == MPL_TOKEN_METADATA_ID,
            CrowdfundError::InvalidMetadataAccount
        );

        let edition_units = campaign.max_editions as u64;
        anchor_spl::token_interface::transfer_checked(
            CpiContext::new(
                ctx.accounts.token_program.to_account_info(),
                TransferChecked {
                    from: ctx.accounts.creator_token_account.to_account_info(),
                    mint: ctx.accounts.nft_mint.to_account_info(),
                    to: ctx.accounts.escrow_token_account.to_account_info(),
                    authority: ctx.accounts.creator.to_account_info(),
                },
            ),
            edition_units,
            ctx.accounts.nft_mint.decimals,
        )?;

        let campaign = &mut ctx.accounts.campaign;
        campaign.nft_in_escrow = true;

        msg!(
            "Escrowed {} reward units for campaign {}",
            edition_units,
            campaign.key()
        );
        Ok(())
    }

    /// Supporter of a funded campaign claims one numbered reward edition.
    /// Edition numbers are assigned in claim order (first claimer takes the
    /// next free slot), not contribution order.
    pub fn claim_nft_from_escrow(ctx: Context<ClaimNftFromEscrow>) -> Result<()> {
        let campaign = &ctx.accounts.campaign;
        require!(campaign.is_funded, CrowdfundError::CampaignNotFunded);
        require!(campaign.nft_in_escrow, CrowdfundError::NftNotInEscrow);
        require!(
            !ctx.accounts.supporter_funding.nft_minted,
            CrowdfundError::AlreadyClaimed
        );
        let edition = next_edition(campaign.editions_minted, campaign.max_editions)?;

        let campaign_key = campaign.key();
        let seeds: &[&[u8]] = &[
            b"escrow",
            campaign_key.as_ref(),
            &[ctx.bumps.escrow_authority],
        ];
        anchor_spl::token_interface::transfer_checked(
            CpiContext::new_with_signer(
                ctx.accounts.token_program.to_account_info(),
                TransferChecked {
                    from: ctx.accounts.escrow_token_account.to_account_info(),
                    mint: ctx.accounts.nft_mint.to_account_info(),
                    to: ctx.accounts.supporter_token_account.to_account_info(),
                    authority: ctx.accounts.escrow_authority.to_account_info(),
                },
                &[seeds],
            ),
            1,
            ctx.accounts.nft_mint.decimals,
        )?;

        let campaign = &mut ctx.accounts.campaign;
        campaign.editions_minted = edition;

        let funding = &mut ctx.accounts.supporter_funding;
        funding.nft_minted = true;
        funding.edition_number = edition;
        funding.edition_mint = ctx.accounts.nft_mint.key();

        msg!(
            "Edition {}/{} claimed by {}",
            edition,
            campaign.max_editions,
            ctx.accounts.supporter.key()
        );
        Ok(())
    }

    /// Admin drains accumulated platform fees from the treasury. The admin is
    /// a configuration value checked at instruction time, not a constant.
    pub fn withdraw_treasury(ctx: Context<WithdrawTreasury>, amount: u64) -> Result<()> {
        require!(amount > 0, CrowdfundError::InvalidAmount);
        require!(
            amount <= ctx.accounts.treasury.lamports(),
            CrowdfundError::InsufficientFunds
        );

        let seeds: &[&[u8]] = &[b"treasury", &[ctx.bumps.treasury]];
        system_program::transfer(
            CpiContext::new_with_signer(
                ctx.accounts.system_program.to_account_info(),
                Transfer {
                    from: ctx.accounts.treasury.to_account_info(),
                    to: ctx.accounts.admin.to_account_info(),
                },
                &[seeds],
            ),
            amount,
        )?;

        msg!("Treasury withdrawal: {} lamports to admin", amount);
        Ok(())
    }
}

/// One-time config: stores the platform admin. WithdrawTreasury validates against this.
#[account]
pub struct Config {
    pub admin: Pubkey,
}

#[account]
pub struct Campaign {
    pub creator: Pubkey,
    pub project_name: String,
    pub description: String,
    pub nft_name: String,
    pub nft_symbol: String,
    pub nft_uri: String,
    pub funding_goal: u64,
    pub raised_amount: u64,
    /// One-way: set when raised_amount first reaches funding_goal.
    pub is_funded: bool,
    /// One-way terminal flag; the withdraw replay guard.
    pub funds_withdrawn: bool,
    pub nft_mint: Pubkey,
    pub nft_in_escrow: bool,
    pub max_editions: u16,
    pub editions_minted: u16,
    pub end_timestamp: i64,
    pub bump: u8,
}

impl Campaign {
    pub const SPACE: usize = 32 // creator
        + 4 + MAX_PROJECT_NAME_LEN
        + 4 + MAX_DESCRIPTION_LEN
        + 4 + MAX_NFT_NAME_LEN
        + 4 + MAX_NFT_SYMBOL_LEN
        + 4 + MAX_NFT_URI_LEN
        + 8 // funding_goal
        + 8 // raised_amount
        + 1 // is_funded
        + 1 // funds_withdrawn
        + 32 // nft_mint
        + 1 // nft_in_escrow
        + 2 // max_editions
        + 2 // editions_minted
        + 8 // end_timestamp
        + 1; // bump

    /// Lifecycle derived from the one-way funded flag and the deadline.
    /// Expiry is only ever observed here, when an instruction asks.
    pub fn lifecycle(&self, now: i64) -> CampaignLifecycle {
        if self.is_funded {
            CampaignLifecycle::Funded
        } else if now >= self.end_timestamp {
            CampaignLifecycle::Failed
        } else {
            CampaignLifecycle::Active
        }
    }
}

/// One record per (campaign, supporter) pair. `is_claimed` and `nft_minted`
/// can never both be true: refunds require a failed campaign, edition claims
/// a funded one, and those lifecycle states are disjoint.
#[account]
pub struct SupporterFunding {
    pub campaign: Pubkey,
    pub supporter: Pubkey,
    /// Cumulative pledge; repeat contributions accumulate here.
    pub amount: u64,
    pub is_claimed: bool,
    pub nft_minted: bool,
    pub edition_number: u16,
    pub edition_mint: Pubkey,
    pub bump: u8,
}

impl SupporterFunding {
    pub const SPACE: usize = 32 + 32 + 8 + 1 + 1 + 2 + 32 + 1;
}

#[derive(Accounts)]
pub struct InitializeConfig<'info> {
    /// Must be the program upgrade authority (validated in instruction).
    #[account(mut)]
    pub authority: Signer<'info>,

    #[account(
        init,
        payer = authority,
        space = 8 + 32,
        seeds = [b"config"],
        bump,
    )]
    pub config: Account<'info, Config>,

    /// Program account (executable) for this program. Used to read programdata address.
    /// CHECK: validated in instruction (must equal ctx.program_id)
    pub program_account: UncheckedAccount<'info>,

    /// ProgramData account for this program. Used to read upgrade_authority_address.
    /// CHECK: validated in instruction (must match program_account's programdata_address)
    pub program_data_account: UncheckedAccount<'info>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct UpdateConfig<'info> {
    /// Must be the program upgrade authority (validated in instruction).
    pub authority: Signer<'info>,

    #[account(
        mut,
        seeds = [b"config"],
        bump,
    )]
    pub config: Account<'info, Config>,

    /// Program account (executable) for this program.
    /// CHECK: validated in instruction
    pub program_account: UncheckedAccount<'info>,

    /// ProgramData account for this program.
    /// CHECK: validated in instruction
    pub program_data_account: UncheckedAccount<'info>,
}

#[derive(Accounts)]
#[instruction(project_name: String)]
pub struct InitializeCampaign<'info> {
    #[account(mut)]
    pub creator: Signer<'info>,

    #[account(
        init,
        payer = creator,
        space = 8 + Campaign::SPACE,
        seeds = [b"campaign", creator.key().as_ref(), project_name.as_bytes()],
        bump,
    )]
    pub campaign: Account<'info, Campaign>,

    /// Pre-existing reward mint; the program never creates mints.
    pub nft_mint: InterfaceAccount<'info, Mint>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct FundCampaign<'info> {
    #[account(mut)]
    pub supporter: Signer<'info>,

    #[account(
        mut,
        seeds = [b"campaign", campaign.creator.as_ref(), campaign.project_name.as_bytes()],
        bump = campaign.bump,
    )]
    pub campaign: Box<Account<'info, Campaign>>,

    #[account(
        init_if_needed,
        payer = supporter,
        space = 8 + SupporterFunding::SPACE,
        seeds = [b"supporter-funding", campaign.key().as_ref(), supporter.key().as_ref()],
        bump,
    )]
    pub supporter_funding: Box<Account<'info, SupporterFunding>>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct WithdrawFunds<'info> {
    #[account(mut)]
    pub creator: Signer<'info>,

    #[account(
        mut,
        seeds = [b"campaign", campaign.creator.as_ref(), campaign.project_name.as_bytes()],
        bump = campaign.bump,
        has_one = creator @ CrowdfundError::Unauthorized,
    )]
    pub campaign: Account<'info, Campaign>,

    #[account(
        mut,
        seeds = [b"treasury"],
        bump,
    )]
    pub treasury: SystemAccount<'info>,
}

#[derive(Accounts)]
pub struct ClaimRefund<'info> {
    #[account(mut)]
    pub supporter: Signer<'info>,

    #[account(
        mut,
        seeds = [b"campaign", campaign.creator.as_ref(), campaign.project_name.as_bytes()],
        bump = campaign.bump,
    )]
    pub campaign: Account<'info, Campaign>,

    #[account(
        mut,
        seeds = [b"supporter-funding", campaign.key().as_ref(), supporter.key().as_ref()],
        bump = supporter_funding.bump,
        constraint = supporter_funding.supporter == supporter.key() @ CrowdfundError::Unauthorized,
    )]
    pub supporter_funding: Account<'info, SupporterFunding>,
}

#[derive(Accounts)]
pub struct TransferNftToEscrow<'info> {
    #[account(mut)]
    pub creator: Signer<'info>,

    #[account(
        mut,
        seeds = [b"campaign", campaign.creator.as_ref(), campaign.project_name.as_bytes()],
        bump = campaign.bump,
        has_one = creator @ CrowdfundError::Unauthorized,
        has_one = nft_mint @ CrowdfundError::InvalidRewardMint,
    )]
    pub campaign: Box<Account<'info, Campaign>>,

    pub nft_mint: InterfaceAccount<'info, Mint>,

    /// Canonical Metaplex metadata PDA of the reward mint.
    /// CHECK: address and owner validated in instruction; content never read.
    pub nft_metadata: UncheckedAccount<'info>,

    #[account(
        mut,
        constraint = creator_token_account.owner == creator.key() @ CrowdfundError::Unauthorized,
        constraint = creator_token_account.mint == nft_mint.key() @ CrowdfundError::InvalidRewardMint,
    )]
    pub creator_token_account: InterfaceAccount<'info, TokenAccount>,

    /// CHECK: PDA for escrow authority
    #[account(seeds = [b"escrow", campaign.key().as_ref()], bump)]
    pub escrow_authority: UncheckedAccount<'info>,

    #[account(
        init,
        payer = creator,
        token::mint = nft_mint,
        token::authority = escrow_authority,
        seeds = [b"escrow-vault", campaign.key().as_ref()],
        bump,
    )]
    pub escrow_token_account: InterfaceAccount<'info, TokenAccount>,

    pub token_program: Interface<'info, TokenInterface>,
    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct ClaimNftFromEscrow<'info> {
    #[account(mut)]
    pub supporter: Signer<'info>,

    #[account(
        mut,
        seeds = [b"campaign", campaign.creator.as_ref(), campaign.project_name.as_bytes()],
        bump = campaign.bump,
        has_one = nft_mint @ CrowdfundError::InvalidRewardMint,
    )]
    pub campaign: Box<Account<'info, Campaign>>,

    #[account(
        mut,
        seeds = [b"supporter-funding", campaign.key().as_ref(), supporter.key().as_ref()],
        bump = supporter_funding.bump,
        constraint = supporter_funding.supporter == supporter.key() @ CrowdfundError::Unauthorized,
    )]
    pub supporter_funding: Box<Account<'info, SupporterFunding>>,

    pub nft_mint: InterfaceAccount<'info, Mint>,

    /// CHECK: PDA for escrow authority
    #[account(seeds = [b"escrow", campaign.key().as_ref()], bump)]
    pub escrow_authority: UncheckedAccount<'info>,

    #[account(
        mut,
        seeds = [b"escrow-vault", campaign.key().as_ref()],
        bump,
        constraint = escrow_token_account.mint == nft_mint.key() @ CrowdfundError::InvalidRewardMint,
    )]
    pub escrow_token_account: InterfaceAccount<'info, TokenAccount>,

    #[account(
        init_if_needed,
        payer = supporter,
        associated_token::mint = nft_mint,
        associated_token::authority = supporter,
        associated_token::token_program = token_program,
    )]
    pub supporter_token_account: InterfaceAccount<'info, TokenAccount>,

    pub token_program: Interface<'info, TokenInterface>,
    pub associated_token_program: Program<'info, anchor_spl::associated_token::AssociatedToken>,
    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct WithdrawTreasury<'info> {
    #[account(mut)]
    pub admin: Signer<'info>,

    #[account(
        seeds = [b"config"],
        bump,
        constraint = config.admin == admin.key() @ CrowdfundError::Unauthorized,
    )]
    pub config: Account<'info, Config>,

    #[account(
        mut,
        seeds = [b"treasury"],
        bump,
    )]
    pub treasury: SystemAccount<'info>,

    pub system_program: Program<'info, System>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn campaign_fixture(is_funded: bool, end_timestamp: i64) -> Campaign {
        Campaign {
            creator: Pubkey::new_unique(),
            project_name: "demo".to_string(),
            description: String::new(),
            nft_name: "Demo".to_string(),
            nft_symbol: "DEMO".to_string(),
            nft_uri: String::new(),
            funding_goal: 1_000_000_000,
            raised_amount: 0,
            is_funded,
            funds_withdrawn: false,
            nft_mint: Pubkey::new_unique(),
            nft_in_escrow: false,
            max_editions: MAX_EDITIONS,
            editions_minted: 0,
            end_timestamp,
            bump: 255,
        }
    }

    #[test]
    fn test_fee_split_spec_example() {
        // 2 SOL raised -> 0.05 SOL fee, 1.95 SOL principal
        let (fee, principal) = fee_split(2_000_000_000).unwrap();
        assert_eq!(fee, 50_000_000);
        assert_eq!(principal, 1_950_000_000);
    }

    #[test]
    fn test_fee_split_reconstructs_total() {
        for raised in [1u64, 39, 40, 41, 1_999, 1_000_000_000, u64::MAX] {
            let (fee, principal) = fee_split(raised).unwrap();
            assert_eq!(fee + principal, raised);
            assert_eq!(fee, ((raised as u128) * 25 / 1000) as u64);
        }
    }

    #[test]
    fn test_fee_split_truncates_below_one_fee_unit() {
        // 25/1000: amounts below 40 lamports round down to a zero fee
        let (fee, principal) = fee_split(39).unwrap();
        assert_eq!(fee, 0);
        assert_eq!(principal, 39);
    }

    #[test]
    fn test_goal_crossing_boundary() {
        // 400M then 600M against a 1 SOL goal: crosses on the second pledge only
        let goal = 1_000_000_000u64;
        let after_first = 400_000_000u64;
        assert!(after_first < goal);
        let after_second = after_first.checked_add(600_000_000).unwrap();
        assert!(after_second >= goal);
    }

    #[test]
    fn test_lifecycle_active_before_deadline() {
        let campaign = campaign_fixture(false, 1_000);
        assert_eq!(campaign.lifecycle(999), CampaignLifecycle::Active);
    }

    #[test]
    fn test_lifecycle_failed_at_deadline() {
        let campaign = campaign_fixture(false, 1_000);
        assert_eq!(campaign.lifecycle(1_000), CampaignLifecycle::Failed);
        assert_eq!(campaign.lifecycle(5_000), CampaignLifecycle::Failed);
    }

    #[test]
    fn test_lifecycle_funded_survives_deadline() {
        // is_funded is one-way; expiry never demotes a funded campaign
        let campaign = campaign_fixture(true, 1_000);
        assert_eq!(campaign.lifecycle(999), CampaignLifecycle::Funded);
        assert_eq!(campaign.lifecycle(5_000), CampaignLifecycle::Funded);
    }

    #[test]
    fn test_edition_sequence_strictly_increasing() {
        let mut minted = 0u16;
        let mut issued = Vec::new();
        while let Ok(edition) = next_edition(minted, MAX_EDITIONS) {
            issued.push(edition);
            minted = edition;
        }
        assert_eq!(issued, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_editions_exhausted_at_cap() {
        assert!(next_edition(MAX_EDITIONS, MAX_EDITIONS).is_err());
        assert_eq!(next_edition(MAX_EDITIONS - 1, MAX_EDITIONS).unwrap(), MAX_EDITIONS);
    }

    #[test]
    fn test_text_bounds_at_boundary() {
        let name32 = "a".repeat(32);
        let desc200 = "d".repeat(200);
        let uri200 = "u".repeat(200);
        assert!(validate_campaign_text(&name32, &desc200, &name32, "SYMBOL1234", &uri200).is_ok());
        assert!(validate_campaign_text(&"a".repeat(33), "", "n", "S", "u").is_err());
        assert!(validate_campaign_text("n", &"d".repeat(201), "n", "S", "u").is_err());
        assert!(validate_campaign_text("n", "", "n", "SYMBOL12345", "u").is_err());
        assert!(validate_campaign_text("", "", "n", "S", "u").is_err());
    }

    #[test]
    fn test_campaign_pda_distinct_per_creator_and_name() {
        let creator_a = Pubkey::new_unique();
        let creator_b = Pubkey::new_unique();
        let (alpha, _) = Pubkey::find_program_address(
            &[b"campaign", creator_a.as_ref(), b"alpha"],
            &crate::ID,
        );
        let (beta, _) = Pubkey::find_program_address(
            &[b"campaign", creator_a.as_ref(), b"beta"],
            &crate::ID,
        );
        let (alpha_b, _) = Pubkey::find_program_address(
            &[b"campaign", creator_b.as_ref(), b"alpha"],
            &crate::ID,
        );
        assert_ne!(alpha, beta);
        assert_ne!(alpha, alpha_b);
        // Same inputs always re-derive the same address
        let (alpha2, _) = Pubkey::find_program_address(
            &[b"campaign", creator_a.as_ref(), b"alpha"],
            &crate::ID,
        );
        assert_eq!(alpha, alpha2);
    }

    #[test]
    fn test_pda_namespace_tags_disjoint() {
        let campaign = Pubkey::new_unique();
        let (authority, _) =
            Pubkey::find_program_address(&[b"escrow", campaign.as_ref()], &crate::ID);
        let (vault, _) =
            Pubkey::find_program_address(&[b"escrow-vault", campaign.as_ref()], &crate::ID);
        let (treasury, _) = Pubkey::find_program_address(&[b"treasury"], &crate::ID);
        assert_ne!(authority, vault);
        assert_ne!(authority, treasury);
    }

    #[test]
    fn test_refund_scenario_amounts() {
        // 0.5 SOL pledged against a 2 SOL goal, deadline passes:
        // the full pledge (and nothing more) is refundable exactly once.
        let mut campaign = campaign_fixture(false, 1_000);
        campaign.funding_goal = 2_000_000_000;
        campaign.raised_amount = 500_000_000;
        assert_eq!(campaign.lifecycle(2_000), CampaignLifecycle::Failed);
        let refund = 500_000_000u64;
        campaign.raised_amount = campaign.raised_amount.saturating_sub(refund);
        assert_eq!(campaign.raised_amount, 0);
    }
}
