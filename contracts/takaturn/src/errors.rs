use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum ContractError {
    Unauthorized = 1,
    FundNotFound = 2,
    InvalidConfig = 3,
    InsufficientCollateral = 4,
    AlreadyMember = 5,
    GroupFull = 6,
    NotAParticipant = 7,
    CollateralNotAccepting = 8,
    IncompleteGroup = 9,
    AlreadyInitiated = 10,
    NotAcceptingContributions = 11,
    AlreadyPaid = 12,
    TooEarly = 13,
    FundingStillOpen = 14,
    CycleNotElapsed = 15,
    FundClosed = 16,
    NotBeneficiary = 17,
    AlreadyWithdrawn = 18,
    GracePeriodActive = 19,
    MemberExpelled = 20,
    NotReleasingPhase = 21,
    NoBalance = 22,
    TermNotEnded = 23,
    StaleOrInvalidPrice = 24,
    Reentrancy = 25,
    ArithmeticOverflow = 26,
}
